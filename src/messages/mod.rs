pub mod diplomacy;
pub mod orders;
pub mod requests;

pub use diplomacy::{TradeProposal, TradeResponse};
pub use orders::MissionOrder;
pub use requests::ActionRequest;
