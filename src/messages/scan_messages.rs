use crate::errors::CoreError;
use crate::types::dtos::{GeoFix, ScanResult};
use crate::types::scan_settings::ScanSettings;
use actix::Message;
use futures_channel::oneshot;

/// Begin a timed area scan. Legal from idle or after a completed scan;
/// starting while one is running is an `InvariantViolation`. `reply` fires
/// exactly once, on natural completion; stopping the scan drops it
/// unfired.
#[derive(Message)]
#[rtype(result = "Result<(), CoreError>")]
pub struct StartScan {
    pub origin: GeoFix,
    /// Filters captured by the caller at start time.
    pub settings: ScanSettings,
    pub reply: oneshot::Sender<ScanResult>,
}

/// Cancel a running scan. The countdown stops synchronously, the discovery
/// query never fires, and the partial state is discarded.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), CoreError>")]
pub struct StopScan;

/// Read-only view of the scan session.
#[derive(Message, Debug, Clone)]
#[rtype(result = "ScanSnapshot")]
pub struct GetScanState;

#[derive(Debug, Clone)]
pub struct ScanSnapshot {
    pub is_scanning: bool,
    pub seconds_left: u32,
    pub result: Option<ScanResult>,
}
