pub mod lifecycle;
pub mod order_cache;
pub mod polling_manager;
pub mod scan_session;
