//! The game roster read by the AI: factions, units, settlements, goods and the map.
//!
//! These are persistent game entities. The planning engine reads them through a
//! per-turn snapshot and never owns them.

pub mod goods;
pub mod map;
pub mod nation;
pub mod settlement;
pub mod units;

pub use goods::{GoodsParcel, GoodsType};
pub use map::{GameMap, Location, MapTile};
pub use nation::{Nation, NationId, NationKind, NationalAdvantage, Stance};
pub use settlement::{Settlement, SettlementKind};
pub use units::{Unit, UnitPlacement, UnitRole, UnitType};
