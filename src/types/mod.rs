pub mod delivery_stage;
pub mod dtos;
pub mod payout_status;
pub mod scan_settings;
