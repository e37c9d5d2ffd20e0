use crate::errors::CoreError;
use crate::gateways::AcceptanceRecord;
use crate::types::delivery_stage::DeliveryStage;
use crate::types::dtos::{ActiveOrder, DiscoveredOrder};
use actix::Message;

/// Claim an offer for this driver. Fails with `InvariantViolation` if an
/// order is already bound or an acceptance is in flight, with
/// `LocationUnavailable` without a location fix, and with the server's
/// rejection verbatim otherwise. On any failure the stage is untouched.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<AcceptanceRecord, CoreError>")]
pub struct AcceptOrder {
    pub candidate: DiscoveredOrder,
}

/// Move the stage forward. Only strictly forward transitions are legal.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), CoreError>")]
pub struct AdvanceStage {
    pub next: DeliveryStage,
}

/// Mark the delivery completed. Idempotent; keeps the active order around
/// for the review step.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FinalizeDelivery;

/// Abandon the delivery from any non-terminal stage.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), CoreError>")]
pub struct CancelDelivery {
    pub reason: String,
}

/// Clear the active order and every tab cache, returning the stage to
/// `Discovering`. Call only once the review step is done: this erases the
/// data the review screen reads.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ResetStore;

/// Read-only projection of the lifecycle store.
#[derive(Message, Debug, Clone)]
#[rtype(result = "DeliverySnapshot")]
pub struct GetDeliverySnapshot;

#[derive(Debug, Clone)]
pub struct DeliverySnapshot {
    pub stage: DeliveryStage,
    pub active_order: Option<ActiveOrder>,
}
