use bevy::prelude::*;
use hexx::Hex;
use serde::{Deserialize, Serialize};

use crate::game::nation::NationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    FreeColonist,
    IndenturedServant,
    PettyCriminal,
    ExpertFarmer,
    ExpertFisherman,
    ExpertLumberjack,
    ExpertOreMiner,
    MasterCarpenter,
    HardyPioneer,
    SeasonedScout,
    VeteranSoldier,
    JesuitMissionary,
    ElderStatesman,
    FirebrandPreacher,
    Artillery,
    WagonTrain,
    TreasureTrain,
    Caravel,
    Merchantman,
    Galleon,
    Privateer,
    Frigate,
    ManOWar,
}

impl UnitType {
    /// Colonist-like units that can work, found settlements and take roles.
    pub fn is_person(self) -> bool {
        !matches!(
            self,
            UnitType::Artillery
                | UnitType::WagonTrain
                | UnitType::TreasureTrain
                | UnitType::Caravel
                | UnitType::Merchantman
                | UnitType::Galleon
                | UnitType::Privateer
                | UnitType::Frigate
                | UnitType::ManOWar
        )
    }

    pub fn is_naval(self) -> bool {
        matches!(
            self,
            UnitType::Caravel
                | UnitType::Merchantman
                | UnitType::Galleon
                | UnitType::Privateer
                | UnitType::Frigate
                | UnitType::ManOWar
        )
    }

    /// Warships able to attack at sea.
    pub fn is_naval_offensive(self) -> bool {
        matches!(self, UnitType::Privateer | UnitType::Frigate | UnitType::ManOWar)
    }

    /// Holds available for passengers and goods.
    pub fn capacity(self) -> u32 {
        match self {
            UnitType::WagonTrain | UnitType::Caravel | UnitType::Privateer => 2,
            UnitType::Merchantman | UnitType::Frigate => 4,
            UnitType::Galleon | UnitType::ManOWar => 6,
            _ => 0,
        }
    }

    pub fn is_carrier(self) -> bool {
        self.capacity() > 0
    }

    /// Holds this unit occupies when carried.
    pub fn space_taken(self) -> u32 {
        match self {
            UnitType::TreasureTrain | UnitType::WagonTrain => 6,
            _ => 1,
        }
    }

    /// Expertise level. Negative for the unskilled classes.
    pub fn skill(self) -> i32 {
        match self {
            UnitType::PettyCriminal => -2,
            UnitType::IndenturedServant => -1,
            UnitType::ExpertFarmer
            | UnitType::ExpertFisherman
            | UnitType::ExpertLumberjack
            | UnitType::ExpertOreMiner
            | UnitType::HardyPioneer
            | UnitType::SeasonedScout => 1,
            UnitType::MasterCarpenter | UnitType::VeteranSoldier => 2,
            UnitType::JesuitMissionary | UnitType::ElderStatesman | UnitType::FirebrandPreacher => {
                3
            }
            _ => 0,
        }
    }

    /// Role this unit type is an expert at, if any.
    pub fn expert_role(self) -> Option<UnitRole> {
        match self {
            UnitType::HardyPioneer => Some(UnitRole::Pioneer),
            UnitType::SeasonedScout => Some(UnitRole::Scout),
            UnitType::VeteranSoldier => Some(UnitRole::Soldier),
            UnitType::JesuitMissionary => Some(UnitRole::Missionary),
            _ => None,
        }
    }

    /// Tiles moved per turn with the default role.
    pub fn base_moves(self) -> u32 {
        match self {
            UnitType::Caravel => 4,
            UnitType::Merchantman => 5,
            UnitType::Galleon | UnitType::Frigate | UnitType::ManOWar => 6,
            UnitType::Privateer => 8,
            _ => 1,
        }
    }

    /// Purchase price in Europe, used when appraising units.
    pub fn base_price(self) -> i64 {
        match self {
            UnitType::FreeColonist => 600,
            UnitType::IndenturedServant => 400,
            UnitType::PettyCriminal => 300,
            UnitType::ExpertFarmer | UnitType::ExpertFisherman | UnitType::ExpertLumberjack => {
                1100
            }
            UnitType::ExpertOreMiner | UnitType::HardyPioneer => 1200,
            UnitType::MasterCarpenter | UnitType::SeasonedScout => 1500,
            UnitType::VeteranSoldier => 2000,
            UnitType::JesuitMissionary | UnitType::FirebrandPreacher => 2000,
            UnitType::ElderStatesman => 1900,
            UnitType::Artillery => 500,
            UnitType::WagonTrain => 300,
            UnitType::TreasureTrain => 0,
            UnitType::Caravel => 1000,
            UnitType::Merchantman => 2000,
            UnitType::Galleon => 3000,
            UnitType::Privateer => 2000,
            UnitType::Frigate => 5000,
            UnitType::ManOWar => 6000,
        }
    }

    /// Land or sea fighting strength with the given role.
    pub fn offence(self, role: UnitRole) -> f64 {
        match self {
            UnitType::Artillery => 7.0,
            UnitType::Privateer => 8.0,
            UnitType::Frigate => 16.0,
            UnitType::ManOWar => 24.0,
            _ => match role {
                UnitRole::Soldier => 2.0 + if self == UnitType::VeteranSoldier { 1.0 } else { 0.0 },
                UnitRole::Dragoon => 3.0 + if self == UnitType::VeteranSoldier { 1.5 } else { 0.0 },
                _ => 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitRole {
    #[default]
    Default,
    Soldier,
    Dragoon,
    Pioneer,
    Scout,
    Missionary,
}

impl UnitRole {
    pub fn is_armed(self) -> bool {
        matches!(self, UnitRole::Soldier | UnitRole::Dragoon)
    }

    /// Extra tiles per turn granted by horses.
    pub fn mounted(self) -> bool {
        matches!(self, UnitRole::Dragoon | UnitRole::Scout)
    }
}

/// Where a unit currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPlacement {
    OnTile(Hex),
    /// Working a building or tile of a settlement.
    InSettlement(Entity),
    Aboard(Entity),
    InEurope,
    /// Sailing the high seas to or from Europe.
    AtSea,
}

#[derive(Component, Debug, Clone)]
pub struct Unit {
    pub owner: NationId,
    pub unit_type: UnitType,
    pub role: UnitRole,
    pub placement: UnitPlacement,
    pub damaged: bool,
    /// Gold carried by a treasure train.
    pub treasure: u32,
}

impl Unit {
    pub fn new(owner: NationId, unit_type: UnitType, placement: UnitPlacement) -> Self {
        Self {
            owner,
            unit_type,
            role: UnitRole::Default,
            placement,
            damaged: false,
            treasure: 0,
        }
    }

    pub fn with_role(mut self, role: UnitRole) -> Self {
        self.role = role;
        self
    }
}
