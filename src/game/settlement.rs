use std::collections::BTreeMap;

use bevy::prelude::*;
use hexx::Hex;

use crate::game::goods::GoodsType;
use crate::game::nation::NationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementKind {
    Colony,
    NativeCamp,
}

#[derive(Component, Debug, Clone)]
pub struct Settlement {
    pub owner: NationId,
    pub name: String,
    pub tile: Hex,
    pub kind: SettlementKind,
    /// Coastal and reachable from the high seas.
    pub connected_port: bool,
    /// Zero without fortifications.
    pub stockade_level: u32,
    /// Defence strength relative to the threat around the settlement.
    pub defence_ratio: f64,
    pub badly_defended: bool,
    pub goods: BTreeMap<GoodsType, u32>,
    /// Tiles around the centre claimed by the settlement.
    pub owned_tiles: u32,
    /// Nation holding the mission in a native camp.
    pub missionary: Option<NationId>,
    pub scouted_by: Vec<NationId>,
}

impl Settlement {
    pub fn colony(owner: NationId, name: impl Into<String>, tile: Hex) -> Self {
        Self {
            owner,
            name: name.into(),
            tile,
            kind: SettlementKind::Colony,
            connected_port: false,
            stockade_level: 0,
            defence_ratio: 1.0,
            badly_defended: false,
            goods: BTreeMap::new(),
            owned_tiles: 0,
            missionary: None,
            scouted_by: Vec::new(),
        }
    }

    pub fn native_camp(owner: NationId, name: impl Into<String>, tile: Hex) -> Self {
        Self {
            kind: SettlementKind::NativeCamp,
            ..Self::colony(owner, name, tile)
        }
    }

    pub fn as_port(mut self) -> Self {
        self.connected_port = true;
        self
    }

    pub fn goods_amount(&self, goods: GoodsType) -> u32 {
        self.goods.get(&goods).copied().unwrap_or(0)
    }
}
