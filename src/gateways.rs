use crate::errors::CoreError;
use crate::types::dtos::{ActiveOrder, DiscoveredOrder, DriverDTO, GeoFix};
use crate::types::payout_status::PayoutReport;
use crate::types::scan_settings::ScanSettings;
use async_trait::async_trait;
use thiserror::Error;

/// Why the device could not produce a location fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location temporarily unavailable")]
    Unavailable,
}

/// Failure of a remote endpoint, as seen at the gateway seam. Converted to
/// a `CoreError` before it reaches any caller above the owning component.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The server understood and refused; message is shown to the driver
    /// verbatim.
    #[error("{0}")]
    Rejected(String),
    /// Transport-level failure; retrying may succeed.
    #[error("{0}")]
    Transient(String),
}

impl From<RemoteError> for CoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected(msg) => CoreError::RemoteRejection(msg),
            RemoteError::Transient(msg) => CoreError::NetworkTransient(msg),
        }
    }
}

/// Device location service.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<GeoFix, LocationError>;
}

/// Remote order discovery endpoint. Takes the scan origin and the filters
/// captured at invocation time.
#[async_trait]
pub trait OrderDiscoveryGateway: Send + Sync {
    async fn discover_orders(
        &self,
        origin: GeoFix,
        settings: &ScanSettings,
    ) -> Result<Vec<DiscoveredOrder>, RemoteError>;
}

/// What a successful acceptance hands back: the bound order plus the
/// updated driver session record.
#[derive(Debug, Clone)]
pub struct AcceptanceRecord {
    pub order: ActiveOrder,
    pub user: DriverDTO,
}

/// Remote order-acceptance endpoint. Rejection (e.g. "already claimed")
/// comes back as `RemoteError::Rejected`.
#[async_trait]
pub trait OrderAcceptanceGateway: Send + Sync {
    async fn accept_order(
        &self,
        candidate: &DiscoveredOrder,
        location: GeoFix,
    ) -> Result<AcceptanceRecord, RemoteError>;
}

/// Remote payout-status endpoint.
#[async_trait]
pub trait PayoutStatusGateway: Send + Sync {
    async fn payout_status(&self, payout_id: &str) -> Result<PayoutReport, RemoteError>;
}

/// Session persistence collaborator. Storage format is its own business;
/// the core only needs to call and await.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn persist_user(&self, user: DriverDTO) -> Result<(), RemoteError>;
}
