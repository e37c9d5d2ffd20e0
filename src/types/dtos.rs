use crate::types::delivery_stage::DeliveryStage;
use serde::{Deserialize, Serialize};

/// A device location fix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoFix {
    pub lat: f64,
    pub lng: f64,
    /// Reported accuracy in meters.
    pub accuracy: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderPriority {
    Normal,
    High,
    Urgent,
}

/// An offer visible to the driver before acceptance. Lives only inside a
/// tab cache entry; never persisted beyond the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredOrder {
    /// Unique order id.
    pub order_id: String,
    /// Human-readable reference code.
    pub reference: String,
    /// Distance from the scan origin, in km.
    pub distance_km: f32,
    pub priority: OrderPriority,
    /// Vehicle types the order requires (empty = any).
    pub vehicle_requirements: Vec<String>,
    /// Total payout for the delivery.
    pub total_price: f64,
}

/// One end of a delivery: where, and who to talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPoint {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub contact_name: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    pub description: String,
    pub weight_kg: f32,
}

/// The order currently bound to the driver, created at acceptance time from
/// a `DiscoveredOrder` and cleared when the lifecycle store resets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub order_id: String,
    pub reference: String,
    pub pickup: ContactPoint,
    pub dropoff: ContactPoint,
    pub package: PackageInfo,
    pub total_price: f64,
    pub vehicle_requirements: Vec<String>,
}

/// Session record for the driver, handed to the persistence collaborator
/// after acceptance or completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDTO {
    /// Unique driver id.
    pub driver_id: String,
    /// Display name.
    pub name: String,
    /// Current delivery stage.
    pub stage: DeliveryStage,
    /// Id of the order currently bound, if any.
    pub current_order_id: Option<String>,
    /// Last known driver position, refreshed while a delivery is running.
    pub position: Option<GeoFix>,
    /// Last update of this record.
    pub time_stamp: std::time::SystemTime,
}

/// Outcome of a completed area scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    pub success: bool,
    /// Number of offers the scan found.
    pub count: usize,
    pub message: String,
}
