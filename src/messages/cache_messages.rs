use crate::types::dtos::{DiscoveredOrder, GeoFix};
use crate::types::scan_settings::ScanSettings;
use actix::Message;

/// Refresh one tab's order cache. Fire-and-forget: the caller observes the
/// outcome through the cache entry. `origin = None` reuses the last origin
/// recorded for that tab; `force_origin` overwrites the recorded origin
/// even when one exists.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FetchAvailableOrders {
    pub origin: Option<GeoFix>,
    pub force_origin: bool,
    pub tab_key: String,
}

/// Drop one tab's cached orders (lost location permission, or an offer from
/// that tab was just claimed).
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ClearTabOrders {
    pub tab_key: String,
}

/// Drop every tab's cached orders. Sent by the lifecycle after an
/// acceptance: once one offer is claimed none of the caches reflect
/// reality.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ClearAllTabs;

/// Replace the discovery settings.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SaveScanSettings {
    pub settings: ScanSettings,
}

/// Restore the documented default settings.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ResetScanSettings;

#[derive(Message, Debug, Clone)]
#[rtype(result = "ScanSettings")]
pub struct GetScanSettings;

/// Read-only view of one tab's cache entry.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Option<TabSnapshot>")]
pub struct GetTabSnapshot {
    pub tab_key: String,
}

#[derive(Debug, Clone)]
pub struct TabSnapshot {
    pub origin: Option<GeoFix>,
    pub available_orders: Vec<DiscoveredOrder>,
    pub order_count: usize,
    pub is_fetching: bool,
}
