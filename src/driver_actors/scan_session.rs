use crate::constants::{SCAN_DURATION_SECS, SCAN_TICK};
use crate::errors::CoreError;
use crate::gateways::OrderDiscoveryGateway;
use crate::logger::Logger;
use crate::messages::scan_messages::{GetScanState, ScanSnapshot, StartScan, StopScan};
use crate::types::dtos::{GeoFix, ScanResult};
use crate::types::scan_settings::ScanSettings;
use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;
use futures_channel::oneshot;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Completed,
}

/// The `ScanSession` actor runs one fixed-duration discovery pass with a
/// live countdown. The countdown and the query are decoupled: ticks give
/// the UI deterministic feedback, and the query fires exactly once, when
/// the countdown reaches zero. One scan runs at a time.
pub struct ScanSession {
    pub phase: ScanPhase,
    pub seconds_left: u32,
    pub duration_secs: u32,
    pub tick: Duration,
    pub countdown: Option<SpawnHandle>,
    pub query: Option<SpawnHandle>,
    pub result: Option<ScanResult>,
    /// Fires exactly once per scan, on natural completion.
    pub reply: Option<oneshot::Sender<ScanResult>>,
    pub pending: Option<(GeoFix, ScanSettings)>,
    pub discovery: Arc<dyn OrderDiscoveryGateway>,
    pub logger: Logger,
}

impl ScanSession {
    pub fn new(discovery: Arc<dyn OrderDiscoveryGateway>) -> Self {
        Self::with_timing(discovery, SCAN_DURATION_SECS, SCAN_TICK)
    }

    /// Constructor with explicit timing, used by tests to shrink the
    /// countdown.
    pub fn with_timing(
        discovery: Arc<dyn OrderDiscoveryGateway>,
        duration_secs: u32,
        tick: Duration,
    ) -> Self {
        Self {
            phase: ScanPhase::Idle,
            seconds_left: 0,
            duration_secs,
            tick,
            countdown: None,
            query: None,
            result: None,
            reply: None,
            pending: None,
            discovery,
            logger: Logger::new("ScanSession", Color::Magenta),
        }
    }

    /// Countdown hit zero: issue the discovery query, once.
    fn run_discovery(&mut self, ctx: &mut Context<Self>) {
        let (origin, settings) = match self.pending.take() {
            Some(pending) => pending,
            None => {
                self.logger.error("Countdown finished with no pending scan parameters");
                return;
            }
        };
        let discovery = self.discovery.clone();
        let handle = ctx.spawn(
            wrap_future(async move { discovery.discover_orders(origin, &settings).await }).map(
                |res, act: &mut Self, _ctx| {
                    act.query = None;
                    let result = match res {
                        Ok(orders) => ScanResult {
                            success: true,
                            count: orders.len(),
                            message: format!("Scan found {} orders", orders.len()),
                        },
                        Err(err) => ScanResult {
                            success: false,
                            count: 0,
                            message: err.to_string(),
                        },
                    };
                    act.phase = ScanPhase::Completed;
                    act.result = Some(result.clone());
                    act.logger.info(format!("Scan completed: {}", result.message));
                    if let Some(reply) = act.reply.take() {
                        // Receiver may have gone away; nothing to do then.
                        let _ = reply.send(result);
                    }
                },
            ),
        );
        self.query = Some(handle);
    }
}

impl Actor for ScanSession {
    type Context = Context<Self>;
}

impl Handler<StartScan> for ScanSession {
    type Result = Result<(), CoreError>;

    fn handle(&mut self, msg: StartScan, ctx: &mut Self::Context) -> Self::Result {
        if self.phase == ScanPhase::Scanning {
            return Err(CoreError::InvariantViolation(
                "a scan is already running".to_string(),
            ));
        }
        self.phase = ScanPhase::Scanning;
        self.seconds_left = self.duration_secs;
        self.result = None;
        self.reply = Some(msg.reply);
        self.pending = Some((msg.origin, msg.settings));
        self.logger.info(format!(
            "Scan started, {} seconds to go",
            self.duration_secs
        ));

        let handle = ctx.run_interval(self.tick, |act, ctx| {
            if act.phase != ScanPhase::Scanning || act.seconds_left == 0 {
                return;
            }
            act.seconds_left -= 1;
            if act.seconds_left == 0 {
                if let Some(countdown) = act.countdown.take() {
                    ctx.cancel_future(countdown);
                }
                act.run_discovery(ctx);
            }
        });
        self.countdown = Some(handle);
        Ok(())
    }
}

impl Handler<StopScan> for ScanSession {
    type Result = Result<(), CoreError>;

    fn handle(&mut self, _msg: StopScan, ctx: &mut Self::Context) -> Self::Result {
        if self.phase != ScanPhase::Scanning {
            return Err(CoreError::InvariantViolation(
                "no scan is running".to_string(),
            ));
        }
        // Cancel both timers synchronously so nothing fires after this
        // point, then drop the reply channel unfired.
        if let Some(countdown) = self.countdown.take() {
            ctx.cancel_future(countdown);
        }
        if let Some(query) = self.query.take() {
            ctx.cancel_future(query);
        }
        self.reply = None;
        self.pending = None;
        self.result = None;
        self.seconds_left = 0;
        self.phase = ScanPhase::Idle;
        self.logger.info("Scan stopped by the driver");
        Ok(())
    }
}

impl Handler<GetScanState> for ScanSession {
    type Result = MessageResult<GetScanState>;

    fn handle(&mut self, _msg: GetScanState, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(ScanSnapshot {
            is_scanning: self.phase == ScanPhase::Scanning,
            seconds_left: self.seconds_left,
            result: self.result.clone(),
        })
    }
}
