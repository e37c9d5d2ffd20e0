use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of one driver's delivery session. Moves strictly forward through
/// the sequence, with `Cancelled` as the only escape from a non-terminal
/// stage. Owned exclusively by the `DeliveryLifecycle` actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStage {
    /// Searching for work; no order bound.
    Discovering,
    /// An order has been claimed, driver heading to work.
    Accepted,
    /// Driving to the pickup point.
    EnRoutePickup,
    /// Package on board, driving to the dropoff point.
    EnRouteDropoff,
    /// Delivery done; order kept around for the review step.
    Completed,
    /// Delivery abandoned before completion.
    Cancelled,
}

impl DeliveryStage {
    fn rank(self) -> u8 {
        match self {
            DeliveryStage::Discovering => 0,
            DeliveryStage::Accepted => 1,
            DeliveryStage::EnRoutePickup => 2,
            DeliveryStage::EnRouteDropoff => 3,
            DeliveryStage::Completed => 4,
            DeliveryStage::Cancelled => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStage::Completed | DeliveryStage::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition: strictly
    /// forward through the ordered stages, or `Cancelled` from anything
    /// non-terminal. Anything else is a programming error.
    pub fn can_advance_to(self, next: DeliveryStage) -> bool {
        if next == DeliveryStage::Cancelled {
            return !self.is_terminal();
        }
        !self.is_terminal() && next.rank() > self.rank() && next.rank() <= DeliveryStage::Completed.rank()
    }
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStage::Discovering => write!(f, "Discovering"),
            DeliveryStage::Accepted => write!(f, "Accepted"),
            DeliveryStage::EnRoutePickup => write!(f, "En route to pickup"),
            DeliveryStage::EnRouteDropoff => write!(f, "En route to dropoff"),
            DeliveryStage::Completed => write!(f, "Completed"),
            DeliveryStage::Cancelled => write!(f, "Cancelled"),
        }
    }
}
