use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote-reported state of one payout request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutStatus {
    /// A settled payout needs no further polling.
    pub fn is_settled(self) -> bool {
        matches!(self, PayoutStatus::Completed | PayoutStatus::Failed)
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutStatus::Pending => write!(f, "Pending"),
            PayoutStatus::Processing => write!(f, "Processing"),
            PayoutStatus::Completed => write!(f, "Completed"),
            PayoutStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One poll response for a payout id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutReport {
    pub payout_id: String,
    pub status: PayoutStatus,
    pub message: Option<String>,
}
