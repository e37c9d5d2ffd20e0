pub mod cache_messages;
pub mod lifecycle_messages;
pub mod payout_messages;
pub mod scan_messages;

pub use cache_messages::*;
pub use lifecycle_messages::*;
pub use payout_messages::*;
pub use scan_messages::*;
