use crate::gateways::OrderDiscoveryGateway;
use crate::logger::Logger;
use crate::messages::cache_messages::{
    ClearAllTabs, ClearTabOrders, FetchAvailableOrders, GetScanSettings, GetTabSnapshot,
    ResetScanSettings, SaveScanSettings, TabSnapshot,
};
use crate::types::dtos::{DiscoveredOrder, GeoFix};
use crate::types::scan_settings::ScanSettings;
use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;
use std::collections::HashMap;
use std::sync::Arc;

/// One logical view's order cache. Independent per tab: a slow fetch on
/// one surface never blocks or contaminates another.
#[derive(Debug, Clone, Default)]
pub struct TabEntry {
    /// Last origin a fetch for this tab used.
    pub origin: Option<GeoFix>,
    pub available_orders: Vec<DiscoveredOrder>,
    pub order_count: usize,
    pub is_fetching: bool,
    /// Sequence number of the newest fetch issued for this tab. Responses
    /// carrying an older number are dropped on arrival, so results apply
    /// in request order, not completion order.
    pub latest_request: u64,
}

/// The `TabOrderCache` actor holds one `TabEntry` per UI surface plus the
/// driver's scan settings, and runs discovery fetches against the remote
/// endpoint without ever blocking a caller.
pub struct TabOrderCache {
    pub entries: HashMap<String, TabEntry>,
    pub settings: ScanSettings,
    /// Global fetch counter feeding `TabEntry::latest_request`.
    pub next_request: u64,
    pub discovery: Arc<dyn OrderDiscoveryGateway>,
    pub logger: Logger,
}

impl TabOrderCache {
    pub fn new(discovery: Arc<dyn OrderDiscoveryGateway>) -> Self {
        Self {
            entries: HashMap::new(),
            settings: ScanSettings::default(),
            next_request: 0,
            discovery,
            logger: Logger::new("TabOrderCache", Color::Cyan),
        }
    }
}

impl Actor for TabOrderCache {
    type Context = Context<Self>;
}

impl Handler<FetchAvailableOrders> for TabOrderCache {
    type Result = ();

    fn handle(&mut self, msg: FetchAvailableOrders, ctx: &mut Self::Context) -> Self::Result {
        let tab_key = msg.tab_key;
        let entry = self.entries.entry(tab_key.clone()).or_default();

        // Recorded origin wins unless the caller forces its own.
        let origin = if msg.force_origin {
            msg.origin
        } else {
            entry.origin.or(msg.origin)
        };
        let origin = match origin {
            Some(origin) => origin,
            None => {
                self.logger.warn(format!(
                    "Fetch for tab '{}' skipped: no origin provided and none recorded",
                    tab_key
                ));
                return;
            }
        };

        self.next_request += 1;
        let request = self.next_request;
        entry.origin = Some(origin);
        entry.latest_request = request;
        entry.is_fetching = true;

        // Settings are captured now; a save while this fetch is in flight
        // does not affect it.
        let settings = self.settings.clone();
        let discovery = self.discovery.clone();
        ctx.spawn(
            wrap_future(async move {
                discovery.discover_orders(origin, &settings).await.map(
                    |mut orders| {
                        orders.retain(|o| settings.allows(o));
                        orders
                    },
                )
            })
            .map(move |res, act: &mut Self, _ctx| {
                let entry = match act.entries.get_mut(&tab_key) {
                    Some(entry) => entry,
                    None => return,
                };
                if entry.latest_request != request {
                    // Superseded by a newer fetch for this tab.
                    return;
                }
                match res {
                    Ok(orders) => {
                        let count = orders.len();
                        entry.order_count = count;
                        entry.available_orders = orders;
                        entry.is_fetching = false;
                        act.logger
                            .info(format!("Tab '{}' refreshed with {} orders", tab_key, count));
                    }
                    Err(err) => {
                        // Keep the previous orders on failure instead of
                        // flashing an empty view.
                        entry.is_fetching = false;
                        act.logger.warn(format!(
                            "Fetch for tab '{}' failed, keeping previous orders: {}",
                            tab_key, err
                        ));
                    }
                }
            }),
        );
    }
}

impl Handler<ClearTabOrders> for TabOrderCache {
    type Result = ();

    fn handle(&mut self, msg: ClearTabOrders, _ctx: &mut Self::Context) -> Self::Result {
        self.next_request += 1;
        if let Some(entry) = self.entries.get_mut(&msg.tab_key) {
            entry.available_orders.clear();
            entry.order_count = 0;
            entry.is_fetching = false;
            // Invalidate any fetch still in flight for this tab so its
            // result cannot resurrect the cleared orders.
            entry.latest_request = self.next_request;
            self.logger
                .info(format!("Cleared orders for tab '{}'", msg.tab_key));
        }
    }
}

impl Handler<ClearAllTabs> for TabOrderCache {
    type Result = ();

    fn handle(&mut self, _msg: ClearAllTabs, _ctx: &mut Self::Context) -> Self::Result {
        for (tab_key, entry) in self.entries.iter_mut() {
            self.next_request += 1;
            entry.available_orders.clear();
            entry.order_count = 0;
            entry.is_fetching = false;
            entry.latest_request = self.next_request;
            self.logger.info(format!("Cleared orders for tab '{}'", tab_key));
        }
    }
}

impl Handler<SaveScanSettings> for TabOrderCache {
    type Result = ();

    fn handle(&mut self, msg: SaveScanSettings, _ctx: &mut Self::Context) -> Self::Result {
        self.settings = msg.settings;
        self.logger.info("Scan settings saved");
    }
}

impl Handler<ResetScanSettings> for TabOrderCache {
    type Result = ();

    fn handle(&mut self, _msg: ResetScanSettings, _ctx: &mut Self::Context) -> Self::Result {
        self.settings = ScanSettings::default();
        self.logger.info("Scan settings reset to defaults");
    }
}

impl Handler<GetScanSettings> for TabOrderCache {
    type Result = MessageResult<GetScanSettings>;

    fn handle(&mut self, _msg: GetScanSettings, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.settings.clone())
    }
}

impl Handler<GetTabSnapshot> for TabOrderCache {
    type Result = MessageResult<GetTabSnapshot>;

    fn handle(&mut self, msg: GetTabSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.entries.get(&msg.tab_key).map(|entry| TabSnapshot {
            origin: entry.origin,
            available_orders: entry.available_orders.clone(),
            order_count: entry.order_count,
            is_fetching: entry.is_fetching,
        }))
    }
}
