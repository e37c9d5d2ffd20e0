use std::time::Duration;

/// Total duration of an area scan, in seconds.
pub const SCAN_DURATION_SECS: u32 = 30;
/// Countdown tick for the scan modal.
pub const SCAN_TICK: Duration = Duration::from_secs(1);

/// Interval between payout status polls.
pub const PAYOUT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Wall-clock ceiling for one payout watch. Past this the payout is
/// presumed still pending and the watch is dropped silently.
pub const PAYOUT_POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Consecutive poll failures tolerated before a watch is dropped.
pub const PAYOUT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Cadence of the driver-position refresh while a delivery is running.
pub const LOCATION_PING_INTERVAL: Duration = Duration::from_secs(15);

/// Window during which the navigation guard suppresses the
/// active-delivery redirect check.
pub const NAV_GUARD_WINDOW: Duration = Duration::from_secs(5);

pub const DEFAULT_SCAN_RADIUS_KM: f32 = 5.0;
pub const DEFAULT_MAX_DISTANCE_KM: f32 = 10.0;
