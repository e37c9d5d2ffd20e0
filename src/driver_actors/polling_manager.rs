use crate::constants::{PAYOUT_MAX_CONSECUTIVE_ERRORS, PAYOUT_POLL_INTERVAL, PAYOUT_POLL_TIMEOUT};
use crate::gateways::{PayoutStatusGateway, RemoteError};
use crate::logger::Logger;
use crate::messages::payout_messages::{PayoutResolved, PollPayout, WatchPayouts, WatchedCount};
use crate::types::payout_status::PayoutReport;
use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bookkeeping for one watched payout id. Destroyed when the status
/// settles, errors hit the cap, or the wall-clock ceiling passes.
pub struct PayoutPollRecord {
    pub attempts: u32,
    pub consecutive_errors: u32,
    pub started_at: Instant,
    pub timer: SpawnHandle,
}

/// The `PollingManager` actor tracks completion of independently-identified
/// payout requests. Each id gets its own interval timer and counters; the
/// watch-set is exactly what the last `WatchPayouts` listed, so no timer
/// ever outlives its record.
pub struct PollingManager {
    pub records: HashMap<String, PayoutPollRecord>,
    /// Ids whose status already settled; re-watching them is a no-op.
    pub resolved: HashSet<String>,
    pub notify: Option<Recipient<PayoutResolved>>,
    pub payouts: Arc<dyn PayoutStatusGateway>,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub max_consecutive_errors: u32,
    pub logger: Logger,
}

impl PollingManager {
    pub fn new(payouts: Arc<dyn PayoutStatusGateway>) -> Self {
        Self::with_timing(
            payouts,
            PAYOUT_POLL_INTERVAL,
            PAYOUT_POLL_TIMEOUT,
            PAYOUT_MAX_CONSECUTIVE_ERRORS,
        )
    }

    /// Constructor with explicit timing, used by tests to shrink the poll
    /// cadence.
    pub fn with_timing(
        payouts: Arc<dyn PayoutStatusGateway>,
        poll_interval: Duration,
        poll_timeout: Duration,
        max_consecutive_errors: u32,
    ) -> Self {
        Self {
            records: HashMap::new(),
            resolved: HashSet::new(),
            notify: None,
            payouts,
            poll_interval,
            poll_timeout,
            max_consecutive_errors,
            logger: Logger::new("PollingManager", Color::Green),
        }
    }

    fn teardown(&mut self, payout_id: &str, ctx: &mut Context<Self>) {
        if let Some(record) = self.records.remove(payout_id) {
            ctx.cancel_future(record.timer);
        }
    }

    fn poll_one(&mut self, payout_id: String, ctx: &mut Context<Self>) {
        let record = match self.records.get_mut(&payout_id) {
            Some(record) => record,
            None => return, // torn down since the timer was armed
        };
        if record.started_at.elapsed() >= self.poll_timeout {
            // Not a failure: the payout is presumed still pending, the
            // caller just stops hearing about it.
            self.logger.info(format!(
                "Payout '{}' still pending after the timeout ceiling, dropping watch",
                payout_id
            ));
            self.teardown(&payout_id, ctx);
            return;
        }
        record.attempts += 1;

        let payouts = self.payouts.clone();
        let queried_id = payout_id.clone();
        ctx.spawn(
            wrap_future(async move { payouts.payout_status(&queried_id).await }).map(
                move |res, act: &mut Self, ctx| act.apply_poll(&payout_id, res, ctx),
            ),
        );
    }

    fn apply_poll(
        &mut self,
        payout_id: &str,
        res: Result<PayoutReport, RemoteError>,
        ctx: &mut Context<Self>,
    ) {
        let record = match self.records.get_mut(payout_id) {
            Some(record) => record,
            None => return, // response landed after teardown
        };
        match res {
            Ok(report) if report.status.is_settled() => {
                self.teardown(payout_id, ctx);
                self.resolved.insert(payout_id.to_string());
                self.logger.info(format!(
                    "Payout '{}' settled with status {}",
                    payout_id, report.status
                ));
                if let Some(notify) = &self.notify {
                    notify.do_send(PayoutResolved {
                        payout_id: payout_id.to_string(),
                        report,
                    });
                }
            }
            Ok(_) => {
                // A clean "still pending" answer forgives earlier hiccups.
                record.consecutive_errors = 0;
            }
            Err(err) => {
                record.consecutive_errors += 1;
                let strikes = record.consecutive_errors;
                if strikes >= self.max_consecutive_errors {
                    self.logger.warn(format!(
                        "Payout '{}' dropped after {} consecutive poll errors: {}",
                        payout_id, strikes, err
                    ));
                    self.teardown(payout_id, ctx);
                } else {
                    self.logger.warn(format!(
                        "Poll error for payout '{}' ({}/{}): {}",
                        payout_id, strikes, self.max_consecutive_errors, err
                    ));
                }
            }
        }
    }
}

impl Actor for PollingManager {
    type Context = Context<Self>;

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        // The context drops its timers with the actor; the records just
        // mirror that.
        self.records.clear();
    }
}

impl Handler<WatchPayouts> for PollingManager {
    type Result = ();

    fn handle(&mut self, msg: WatchPayouts, ctx: &mut Self::Context) -> Self::Result {
        self.notify = Some(msg.notify);

        let keep: HashSet<&String> = msg.ids.iter().collect();
        let stale: Vec<String> = self
            .records
            .keys()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in stale {
            self.logger
                .info(format!("Payout '{}' left the watch-set, dropping", id));
            self.teardown(&id, ctx);
        }

        for id in msg.ids {
            if self.records.contains_key(&id) || self.resolved.contains(&id) {
                continue;
            }
            let timer = {
                let interval_id = id.clone();
                ctx.run_interval(self.poll_interval, move |act, ctx| {
                    act.poll_one(interval_id.clone(), ctx)
                })
            };
            self.records.insert(
                id.clone(),
                PayoutPollRecord {
                    attempts: 0,
                    consecutive_errors: 0,
                    started_at: Instant::now(),
                    timer,
                },
            );
            self.logger.info(format!("Watching payout '{}'", id));
            self.poll_one(id, ctx);
        }
    }
}

impl Handler<PollPayout> for PollingManager {
    type Result = ();

    fn handle(&mut self, msg: PollPayout, ctx: &mut Self::Context) -> Self::Result {
        self.poll_one(msg.payout_id, ctx);
    }
}

impl Handler<WatchedCount> for PollingManager {
    type Result = usize;

    fn handle(&mut self, _msg: WatchedCount, _ctx: &mut Self::Context) -> Self::Result {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::payout_status::PayoutStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::sleep;

    /// Payout gateway answering call N for an id with the Nth scripted
    /// step; the last step repeats. Unknown ids stay pending.
    struct ScriptedPayouts {
        script: HashMap<String, Vec<Result<PayoutStatus, RemoteError>>>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl ScriptedPayouts {
        fn new(script: Vec<(&str, Vec<Result<PayoutStatus, RemoteError>>)>) -> Arc<Self> {
            Arc::new(Self {
                script: script
                    .into_iter()
                    .map(|(id, steps)| (id.to_string(), steps))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
            })
        }

        fn calls_for(&self, id: &str) -> usize {
            *self.calls.lock().unwrap().get(id).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl PayoutStatusGateway for ScriptedPayouts {
        async fn payout_status(&self, payout_id: &str) -> Result<PayoutReport, RemoteError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(payout_id.to_string()).or_insert(0);
                let current = *n;
                *n += 1;
                current
            };
            let steps = match self.script.get(payout_id) {
                Some(steps) if !steps.is_empty() => steps,
                _ => return Ok(pending_report(payout_id)),
            };
            steps[call.min(steps.len() - 1)]
                .clone()
                .map(|status| PayoutReport {
                    payout_id: payout_id.to_string(),
                    status,
                    message: None,
                })
        }
    }

    fn pending_report(payout_id: &str) -> PayoutReport {
        PayoutReport {
            payout_id: payout_id.to_string(),
            status: PayoutStatus::Pending,
            message: None,
        }
    }

    /// Collects `PayoutResolved` notifications for assertions.
    #[derive(Default)]
    struct Collector {
        resolved: Vec<PayoutResolved>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<PayoutResolved> for Collector {
        type Result = ();

        fn handle(&mut self, msg: PayoutResolved, _ctx: &mut Self::Context) -> Self::Result {
            self.resolved.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<(String, PayoutStatus)>")]
    struct GetResolved;

    impl Handler<GetResolved> for Collector {
        type Result = MessageResult<GetResolved>;

        fn handle(&mut self, _msg: GetResolved, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(
                self.resolved
                    .iter()
                    .map(|r| (r.payout_id.clone(), r.report.status))
                    .collect(),
            )
        }
    }

    fn manager(
        payouts: Arc<ScriptedPayouts>,
        interval_ms: u64,
        timeout_ms: u64,
    ) -> Addr<PollingManager> {
        PollingManager::with_timing(
            payouts,
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
            PAYOUT_MAX_CONSECUTIVE_ERRORS,
        )
        .start()
    }

    #[actix_rt::test]
    async fn resolves_on_third_poll_exactly_once() {
        let payouts = ScriptedPayouts::new(vec![(
            "p1",
            vec![
                Ok(PayoutStatus::Pending),
                Ok(PayoutStatus::Processing),
                Ok(PayoutStatus::Completed),
            ],
        )]);
        let collector = Collector::default().start();
        let mgr = manager(payouts.clone(), 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(150)).await;

        let resolved = collector.send(GetResolved).await.unwrap();
        assert_eq!(
            resolved,
            vec![("p1".to_string(), PayoutStatus::Completed)]
        );
        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 0);

        // Teardown stops the polling: the call count is frozen at three,
        // and even a manual poke for the settled id is a no-op.
        assert_eq!(payouts.calls_for("p1"), 3);
        mgr.send(PollPayout {
            payout_id: "p1".to_string(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(payouts.calls_for("p1"), 3);
    }

    #[actix_rt::test]
    async fn never_settling_payout_hits_the_timeout_ceiling() {
        let payouts = ScriptedPayouts::new(vec![("p1", vec![Ok(PayoutStatus::Pending)])]);
        let collector = Collector::default().start();
        let mgr = manager(payouts.clone(), 30, 120);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(300)).await;

        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 0);
        assert!(collector.send(GetResolved).await.unwrap().is_empty());

        let frozen = payouts.calls_for("p1");
        sleep(Duration::from_millis(120)).await;
        assert_eq!(payouts.calls_for("p1"), frozen);
    }

    #[actix_rt::test]
    async fn three_consecutive_errors_drop_the_watch_silently() {
        let payouts = ScriptedPayouts::new(vec![(
            "p1",
            vec![Err(RemoteError::Transient("gateway timeout".to_string()))],
        )]);
        let collector = Collector::default().start();
        let mgr = manager(payouts.clone(), 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(200)).await;

        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 0);
        assert!(collector.send(GetResolved).await.unwrap().is_empty());
        assert_eq!(payouts.calls_for("p1"), 3);
    }

    #[actix_rt::test]
    async fn a_transient_error_between_clean_polls_is_forgiven() {
        let payouts = ScriptedPayouts::new(vec![(
            "p1",
            vec![
                Err(RemoteError::Transient("blip".to_string())),
                Ok(PayoutStatus::Pending),
                Err(RemoteError::Transient("blip".to_string())),
                Ok(PayoutStatus::Pending),
                Err(RemoteError::Transient("blip".to_string())),
                Ok(PayoutStatus::Completed),
            ],
        )]);
        let collector = Collector::default().start();
        let mgr = manager(payouts, 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(250)).await;

        // Errors never ran three in a row, so the watch survived to the
        // settled answer.
        let resolved = collector.send(GetResolved).await.unwrap();
        assert_eq!(resolved, vec![("p1".to_string(), PayoutStatus::Completed)]);
    }

    #[actix_rt::test]
    async fn rewatching_replaces_the_watch_set() {
        let payouts = ScriptedPayouts::new(vec![]);
        let collector = Collector::default().start();
        let mgr = manager(payouts.clone(), 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string(), "p2".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 2);

        mgr.send(WatchPayouts {
            ids: vec!["p2".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 1);

        // p1's timer is gone: its call count stops moving.
        let frozen = payouts.calls_for("p1");
        sleep(Duration::from_millis(100)).await;
        assert_eq!(payouts.calls_for("p1"), frozen);
        assert!(payouts.calls_for("p2") > 1);
    }

    #[actix_rt::test]
    async fn empty_watch_list_tears_everything_down() {
        let payouts = ScriptedPayouts::new(vec![]);
        let collector = Collector::default().start();
        let mgr = manager(payouts, 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string(), "p2".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        mgr.send(WatchPayouts {
            ids: Vec::new(),
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn settled_ids_are_not_watched_again() {
        let payouts = ScriptedPayouts::new(vec![("p1", vec![Ok(PayoutStatus::Completed)])]);
        let collector = Collector::default().start();
        let mgr = manager(payouts.clone(), 20, 10_000);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(payouts.calls_for("p1"), 1);

        mgr.send(WatchPayouts {
            ids: vec!["p1".to_string()],
            notify: collector.clone().recipient(),
        })
        .await
        .unwrap();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(mgr.send(WatchedCount).await.unwrap(), 0);
        assert_eq!(payouts.calls_for("p1"), 1);

        let resolved = collector.send(GetResolved).await.unwrap();
        assert_eq!(resolved.len(), 1);
    }
}
