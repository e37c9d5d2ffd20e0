use crate::types::payout_status::PayoutReport;
use actix::prelude::*;

/// Replace the watch-set with exactly `ids`. New ids get an immediate poll
/// and a per-id interval; ids missing from the list are torn down at once,
/// resolved or not. An empty list tears down everything.
#[derive(Message)]
#[rtype(result = "()")]
pub struct WatchPayouts {
    pub ids: Vec<String>,
    pub notify: Recipient<PayoutResolved>,
}

/// Delivered exactly once per payout id, when its status settles.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PayoutResolved {
    pub payout_id: String,
    pub report: PayoutReport,
}

/// Internal: poll one watched id now.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PollPayout {
    pub payout_id: String,
}

/// Number of ids currently being watched (diagnostics).
#[derive(Message, Debug, Clone)]
#[rtype(result = "usize")]
pub struct WatchedCount;
