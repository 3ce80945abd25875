use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::map::Location;
use crate::game::nation::NationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GoodsType {
    Food,
    Sugar,
    Tobacco,
    Cotton,
    Furs,
    Lumber,
    Ore,
    Silver,
    Horses,
    Rum,
    Cigars,
    Cloth,
    Coats,
    TradeGoods,
    Tools,
    Muskets,
    // Produced but never stored in a warehouse
    Hammers,
    Bells,
    Crosses,
}

impl GoodsType {
    pub const ALL: [GoodsType; 19] = [
        GoodsType::Food,
        GoodsType::Sugar,
        GoodsType::Tobacco,
        GoodsType::Cotton,
        GoodsType::Furs,
        GoodsType::Lumber,
        GoodsType::Ore,
        GoodsType::Silver,
        GoodsType::Horses,
        GoodsType::Rum,
        GoodsType::Cigars,
        GoodsType::Cloth,
        GoodsType::Coats,
        GoodsType::TradeGoods,
        GoodsType::Tools,
        GoodsType::Muskets,
        GoodsType::Hammers,
        GoodsType::Bells,
        GoodsType::Crosses,
    ];

    /// Whether the goods can sit in a warehouse and be carried.
    pub fn is_storable(self) -> bool {
        !matches!(self, GoodsType::Hammers | GoodsType::Bells | GoodsType::Crosses)
    }

    pub fn is_food(self) -> bool {
        self == GoodsType::Food
    }

    /// Livestock that multiplies when enough is kept together.
    pub fn is_breedable(self) -> bool {
        self == GoodsType::Horses
    }

    pub fn is_military(self) -> bool {
        matches!(self, GoodsType::Muskets | GoodsType::Horses)
    }

    /// Goods natives want in exchange for their wares.
    pub fn is_trade_goods(self) -> bool {
        self == GoodsType::TradeGoods
    }

    pub fn is_building_material(self) -> bool {
        matches!(self, GoodsType::Lumber | GoodsType::Tools | GoodsType::Ore)
    }
}

impl fmt::Display for GoodsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoodsType::Food => "Food",
            GoodsType::Sugar => "Sugar",
            GoodsType::Tobacco => "Tobacco",
            GoodsType::Cotton => "Cotton",
            GoodsType::Furs => "Furs",
            GoodsType::Lumber => "Lumber",
            GoodsType::Ore => "Ore",
            GoodsType::Silver => "Silver",
            GoodsType::Horses => "Horses",
            GoodsType::Rum => "Rum",
            GoodsType::Cigars => "Cigars",
            GoodsType::Cloth => "Cloth",
            GoodsType::Coats => "Coats",
            GoodsType::TradeGoods => "Trade goods",
            GoodsType::Tools => "Tools",
            GoodsType::Muskets => "Muskets",
            GoodsType::Hammers => "Hammers",
            GoodsType::Bells => "Bells",
            GoodsType::Crosses => "Crosses",
        };
        write!(f, "{}", name)
    }
}

/// A lot of goods a settlement has set aside for shipment.
#[derive(Component, Debug, Clone)]
pub struct GoodsParcel {
    pub owner: NationId,
    pub settlement: Option<Entity>,
    pub goods_type: GoodsType,
    pub amount: u32,
    pub location: Option<Location>,
    pub destination: Option<Location>,
    /// Carrier currently holding the parcel.
    pub aboard: Option<Entity>,
}
