use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable identity of a faction, independent of its ECS entity.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NationId(pub u16);

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nation#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NationKind {
    European,
    /// The crown's expeditionary force. Excluded from naval averages.
    Royal,
    Native,
}

/// Diplomatic stance one faction holds towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Uncontacted,
    Peace,
    CeaseFire,
    Alliance,
    War,
}

impl Stance {
    pub fn label(&self) -> &'static str {
        match self {
            Stance::Uncontacted => "Uncontacted",
            Stance::Peace => "Peace",
            Stance::CeaseFire => "Cease fire",
            Stance::Alliance => "Alliance",
            Stance::War => "War",
        }
    }
}

/// Strategic leaning chosen at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NationalAdvantage {
    #[default]
    None,
    Agriculture,
    Building,
    Conquest,
    Immigration,
    Trade,
}

/// A faction taking part in the game.
#[derive(Component, Debug, Clone)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    pub kind: NationKind,
    pub gold: i64,
    pub can_found_settlements: bool,
    /// Trading partner whose peace offers are always taken as neutral.
    pub always_offered_peace: bool,
    pub advantage: NationalAdvantage,
    pub stances: BTreeMap<NationId, Stance>,
    /// Ill will felt towards other factions. Missing means no opinion yet.
    pub tension: BTreeMap<NationId, u32>,
    /// Turn of the latest peace or alliance with each faction.
    pub peace_since: BTreeMap<NationId, u32>,
}

impl Nation {
    pub fn european(id: NationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NationKind::European,
            gold: 0,
            can_found_settlements: true,
            always_offered_peace: false,
            advantage: NationalAdvantage::None,
            stances: BTreeMap::new(),
            tension: BTreeMap::new(),
            peace_since: BTreeMap::new(),
        }
    }

    pub fn native(id: NationId, name: impl Into<String>) -> Self {
        Self {
            kind: NationKind::Native,
            can_found_settlements: false,
            ..Self::european(id, name)
        }
    }

    pub fn with_stance(mut self, other: NationId, stance: Stance) -> Self {
        self.stances.insert(other, stance);
        self
    }

    pub fn with_tension(mut self, other: NationId, tension: u32) -> Self {
        self.tension.insert(other, tension);
        self
    }

    pub fn stance_towards(&self, other: NationId) -> Stance {
        self.stances
            .get(&other)
            .copied()
            .unwrap_or(Stance::Uncontacted)
    }
}
