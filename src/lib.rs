pub mod constants;
pub mod driver_actors;
pub mod errors;
pub mod gateways;
pub mod logger;
pub mod messages;
pub mod navigation_guard;
pub mod types;
pub mod utils;
