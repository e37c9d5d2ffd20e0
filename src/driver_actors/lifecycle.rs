use crate::constants::LOCATION_PING_INTERVAL;
use crate::driver_actors::order_cache::TabOrderCache;
use crate::errors::CoreError;
use crate::gateways::{
    AcceptanceRecord, LocationProvider, OrderAcceptanceGateway, SessionStore,
};
use crate::logger::Logger;
use crate::messages::cache_messages::ClearAllTabs;
use crate::messages::lifecycle_messages::{
    AcceptOrder, AdvanceStage, CancelDelivery, DeliverySnapshot, FinalizeDelivery,
    GetDeliverySnapshot, ResetStore,
};
use crate::types::delivery_stage::DeliveryStage;
use crate::types::dtos::{ActiveOrder, DriverDTO};
use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;
use std::sync::Arc;

/// The `DeliveryLifecycle` actor is the single source of truth for "is
/// this driver currently delivering". It alone moves `DeliveryStage`
/// forward; every other component only reads it through snapshots.
pub struct DeliveryLifecycle {
    pub stage: DeliveryStage,
    pub active_order: Option<ActiveOrder>,
    pub driver: DriverDTO,
    /// Acceptance already running; a second request is rejected, not
    /// queued.
    pub accept_in_flight: bool,
    /// Periodic position refresh, running only while a delivery is.
    pub tracking: Option<SpawnHandle>,
    pub location: Arc<dyn LocationProvider>,
    pub acceptance: Arc<dyn OrderAcceptanceGateway>,
    pub sessions: Arc<dyn SessionStore>,
    /// Tab caches to invalidate once an offer is claimed.
    pub order_cache: Option<Addr<TabOrderCache>>,
    pub logger: Logger,
}

impl DeliveryLifecycle {
    pub fn new(
        driver_id: String,
        name: String,
        location: Arc<dyn LocationProvider>,
        acceptance: Arc<dyn OrderAcceptanceGateway>,
        sessions: Arc<dyn SessionStore>,
        order_cache: Option<Addr<TabOrderCache>>,
    ) -> Self {
        let logger = Logger::new(format!("Lifecycle {}", &driver_id), Color::Blue);
        Self {
            stage: DeliveryStage::Discovering,
            active_order: None,
            driver: DriverDTO {
                driver_id,
                name,
                stage: DeliveryStage::Discovering,
                current_order_id: None,
                position: None,
                time_stamp: std::time::SystemTime::now(),
            },
            accept_in_flight: false,
            tracking: None,
            location,
            acceptance,
            sessions,
            order_cache,
            logger,
        }
    }

    fn set_stage(&mut self, next: DeliveryStage) {
        self.stage = next;
        self.driver.stage = next;
        self.driver.time_stamp = std::time::SystemTime::now();
        self.logger.info(format!("Stage is now {}", next));
    }

    fn start_tracking(&mut self, ctx: &mut Context<Self>) {
        let handle = ctx.run_interval(LOCATION_PING_INTERVAL, |act, ctx| {
            let location = act.location.clone();
            ctx.spawn(wrap_future(async move { location.current_location().await }).map(
                |res, act: &mut Self, _ctx| {
                    if let Ok(fix) = res {
                        act.driver.position = Some(fix);
                    }
                },
            ));
        });
        self.tracking = Some(handle);
    }

    /// Stops the location-tracking side process. Part of both finalize and
    /// cancel cleanup.
    fn stop_tracking(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.tracking.take() {
            ctx.cancel_future(handle);
            self.logger.info("Location tracking stopped");
        }
    }

    /// Hands the updated session record to the persistence collaborator.
    /// Best effort: a persistence failure is logged, never fatal to a
    /// lifecycle transition that already happened remotely.
    fn persist_driver(&self, ctx: &mut Context<Self>) {
        let sessions = self.sessions.clone();
        let record = self.driver.clone();
        ctx.spawn(wrap_future(async move { sessions.persist_user(record).await }).map(
            |res, act: &mut Self, _ctx| {
                if let Err(err) = res {
                    act.logger.warn(format!("Session persistence failed: {}", err));
                }
            },
        ));
    }

    fn invalidate_caches(&self) {
        if let Some(cache) = &self.order_cache {
            cache.do_send(ClearAllTabs);
        }
    }
}

impl Actor for DeliveryLifecycle {
    type Context = Context<Self>;
}

impl Handler<AcceptOrder> for DeliveryLifecycle {
    type Result = ResponseActFuture<Self, Result<AcceptanceRecord, CoreError>>;

    fn handle(&mut self, msg: AcceptOrder, _ctx: &mut Self::Context) -> Self::Result {
        if self.stage != DeliveryStage::Discovering || self.active_order.is_some() {
            let err = CoreError::InvariantViolation(format!(
                "cannot accept an order while stage is {}",
                self.stage
            ));
            return Box::pin(async move { Err(err) }.into_actor(self));
        }
        if self.accept_in_flight {
            let err = CoreError::InvariantViolation(
                "an acceptance is already in flight".to_string(),
            );
            return Box::pin(async move { Err(err) }.into_actor(self));
        }
        self.accept_in_flight = true;
        self.logger.info(format!(
            "Accepting order '{}' ({})",
            msg.candidate.order_id, msg.candidate.reference
        ));

        let location = self.location.clone();
        let acceptance = self.acceptance.clone();
        let sessions = self.sessions.clone();
        let candidate = msg.candidate;
        Box::pin(
            async move {
                // Never accept blind: downstream pricing and routing need
                // the driver's position at acceptance time.
                let fix = location
                    .current_location()
                    .await
                    .map_err(|_| CoreError::LocationUnavailable)?;
                let record = acceptance
                    .accept_order(&candidate, fix)
                    .await
                    .map_err(CoreError::from)?;
                sessions
                    .persist_user(record.user.clone())
                    .await
                    .map_err(CoreError::from)?;
                Ok((record, fix))
            }
            .into_actor(self)
            .map(|res: Result<(AcceptanceRecord, _), CoreError>, act: &mut Self, ctx| {
                act.accept_in_flight = false;
                match res {
                    Ok((record, fix)) => {
                        act.set_stage(DeliveryStage::Accepted);
                        act.active_order = Some(record.order.clone());
                        act.driver = record.user.clone();
                        act.driver.position = Some(fix);
                        act.invalidate_caches();
                        act.start_tracking(ctx);
                        Ok(record)
                    }
                    Err(err) => {
                        // Stage untouched; the candidate is simply gone and
                        // the caller surfaces the message.
                        act.logger.warn(format!("Acceptance failed: {}", err));
                        Err(err)
                    }
                }
            }),
        )
    }
}

impl Handler<AdvanceStage> for DeliveryLifecycle {
    type Result = Result<(), CoreError>;

    fn handle(&mut self, msg: AdvanceStage, _ctx: &mut Self::Context) -> Self::Result {
        if !self.stage.can_advance_to(msg.next) {
            return Err(CoreError::InvariantViolation(format!(
                "illegal transition {} -> {}",
                self.stage, msg.next
            )));
        }
        self.set_stage(msg.next);
        Ok(())
    }
}

impl Handler<FinalizeDelivery> for DeliveryLifecycle {
    type Result = ();

    fn handle(&mut self, _msg: FinalizeDelivery, ctx: &mut Self::Context) -> Self::Result {
        if self.stage == DeliveryStage::Completed {
            return; // idempotent
        }
        if self.stage == DeliveryStage::Cancelled {
            self.logger
                .warn("Finalize ignored: the delivery was already cancelled");
            return;
        }
        self.set_stage(DeliveryStage::Completed);
        self.stop_tracking(ctx);
        // The active order stays bound: the review screen reads it.
        self.persist_driver(ctx);
    }
}

impl Handler<CancelDelivery> for DeliveryLifecycle {
    type Result = Result<(), CoreError>;

    fn handle(&mut self, msg: CancelDelivery, ctx: &mut Self::Context) -> Self::Result {
        if self.stage.is_terminal() {
            return Err(CoreError::InvariantViolation(format!(
                "cannot cancel from terminal stage {}",
                self.stage
            )));
        }
        self.logger.warn(format!("Delivery cancelled: {}", msg.reason));
        self.set_stage(DeliveryStage::Cancelled);
        self.stop_tracking(ctx);
        self.persist_driver(ctx);
        Ok(())
    }
}

impl Handler<ResetStore> for DeliveryLifecycle {
    type Result = ();

    fn handle(&mut self, _msg: ResetStore, ctx: &mut Self::Context) -> Self::Result {
        self.active_order = None;
        self.driver.current_order_id = None;
        self.stop_tracking(ctx);
        self.invalidate_caches();
        self.set_stage(DeliveryStage::Discovering);
        self.logger.info("Store reset, back to discovering");
    }
}

impl Handler<GetDeliverySnapshot> for DeliveryLifecycle {
    type Result = MessageResult<GetDeliverySnapshot>;

    fn handle(&mut self, _msg: GetDeliverySnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(DeliverySnapshot {
            stage: self.stage,
            active_order: self.active_order.clone(),
        })
    }
}
