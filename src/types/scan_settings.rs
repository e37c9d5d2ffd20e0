use crate::constants::{DEFAULT_MAX_DISTANCE_KM, DEFAULT_SCAN_RADIUS_KM};
use crate::types::dtos::{DiscoveredOrder, OrderPriority};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanArea {
    /// Scan around the driver's current position.
    Current,
    /// Scan the driver's whole assigned territory.
    Territorial,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFilter {
    All,
    HighPriority,
    Urgent,
}

/// Driver-configurable discovery parameters. Mutated only by an explicit
/// save or reset; fetches capture a copy at invocation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSettings {
    pub area: ScanArea,
    pub radius_km: f32,
    pub max_distance_km: f32,
    /// Vehicle types to include (empty = any vehicle).
    pub vehicle_filter: Vec<String>,
    pub priority_filter: PriorityFilter,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            area: ScanArea::Current,
            radius_km: DEFAULT_SCAN_RADIUS_KM,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            vehicle_filter: Vec::new(),
            priority_filter: PriorityFilter::All,
        }
    }
}

impl ScanSettings {
    /// Whether an offer passes the vehicle, priority and distance filters.
    /// The discovery endpoint already filters server-side; this is applied
    /// again on arrival so a lagging backend never surfaces out-of-policy
    /// offers.
    pub fn allows(&self, order: &DiscoveredOrder) -> bool {
        if order.distance_km > self.max_distance_km {
            return false;
        }
        if !self.vehicle_filter.is_empty()
            && !order
                .vehicle_requirements
                .iter()
                .any(|v| self.vehicle_filter.contains(v))
        {
            return false;
        }
        match self.priority_filter {
            PriorityFilter::All => true,
            PriorityFilter::HighPriority => {
                matches!(order.priority, OrderPriority::High | OrderPriority::Urgent)
            }
            PriorityFilter::Urgent => order.priority == OrderPriority::Urgent,
        }
    }
}
