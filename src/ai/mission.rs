//! What a controllable unit is currently trying to achieve.

use bevy::prelude::*;
use hexx::Hex;

use crate::ai::snapshot::{AiSnapshot, UnitSnapshot};
use crate::ai::transport::TransportMission;
use crate::ai::wishes::WishId;
use crate::game::{Location, SettlementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MissionKind {
    BuildColony,
    Pioneering,
    Scouting,
    Transport,
    DefendSettlement,
    SeekAndDestroy,
    WanderHostile,
    Missionary,
    WorkInsideColony,
    CashInTreasureTrain,
    IdleAtSettlement,
    WishRealization,
    Privateer,
}

impl MissionKind {
    pub fn label(self) -> &'static str {
        match self {
            MissionKind::BuildColony => "build colony",
            MissionKind::Pioneering => "pioneering",
            MissionKind::Scouting => "scouting",
            MissionKind::Transport => "transport",
            MissionKind::DefendSettlement => "defend settlement",
            MissionKind::SeekAndDestroy => "seek and destroy",
            MissionKind::WanderHostile => "wander hostile",
            MissionKind::Missionary => "missionary",
            MissionKind::WorkInsideColony => "work inside colony",
            MissionKind::CashInTreasureTrain => "cash in treasure",
            MissionKind::IdleAtSettlement => "idle",
            MissionKind::WishRealization => "wish realization",
            MissionKind::Privateer => "privateer",
        }
    }
}

/// Something worth attacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostileTarget {
    Unit(Entity),
    Settlement(Entity),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mission {
    BuildColony {
        target: Hex,
    },
    Pioneer {
        target: Hex,
    },
    Scout {
        target: Hex,
    },
    Transport(TransportMission),
    DefendSettlement {
        settlement: Entity,
        target: Hex,
    },
    SeekAndDestroy {
        target: HostileTarget,
        location: Hex,
    },
    WanderHostile {
        around: Option<Hex>,
    },
    Missionary {
        settlement: Entity,
        target: Hex,
    },
    WorkInsideColony {
        settlement: Entity,
        target: Hex,
    },
    CashInTreasureTrain {
        target: Location,
    },
    IdleAtSettlement {
        target: Option<Location>,
    },
    WishRealization {
        wish: WishId,
        target: Location,
    },
    Privateer {
        prey: Entity,
        location: Hex,
    },
}

impl Mission {
    pub fn kind(&self) -> MissionKind {
        match self {
            Mission::BuildColony { .. } => MissionKind::BuildColony,
            Mission::Pioneer { .. } => MissionKind::Pioneering,
            Mission::Scout { .. } => MissionKind::Scouting,
            Mission::Transport(_) => MissionKind::Transport,
            Mission::DefendSettlement { .. } => MissionKind::DefendSettlement,
            Mission::SeekAndDestroy { .. } => MissionKind::SeekAndDestroy,
            Mission::WanderHostile { .. } => MissionKind::WanderHostile,
            Mission::Missionary { .. } => MissionKind::Missionary,
            Mission::WorkInsideColony { .. } => MissionKind::WorkInsideColony,
            Mission::CashInTreasureTrain { .. } => MissionKind::CashInTreasureTrain,
            Mission::IdleAtSettlement { .. } => MissionKind::IdleAtSettlement,
            Mission::WishRealization { .. } => MissionKind::WishRealization,
            Mission::Privateer { .. } => MissionKind::Privateer,
        }
    }

    /// Where the unit is headed. Roaming missions have no fixed target.
    pub fn target(&self) -> Option<Location> {
        match self {
            Mission::BuildColony { target }
            | Mission::Pioneer { target }
            | Mission::Scout { target }
            | Mission::DefendSettlement { target, .. }
            | Mission::Missionary { target, .. }
            | Mission::WorkInsideColony { target, .. } => Some(Location::Tile(*target)),
            Mission::SeekAndDestroy { location, .. } | Mission::Privateer { location, .. } => {
                Some(Location::Tile(*location))
            }
            Mission::Transport(transport) => transport.target(),
            Mission::WanderHostile { .. } => None,
            Mission::CashInTreasureTrain { target } | Mission::WishRealization { target, .. } => {
                Some(*target)
            }
            Mission::IdleAtSettlement { target } => *target,
        }
    }

    /// Missions reassigned from scratch every turn.
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            Mission::IdleAtSettlement { .. } | Mission::WanderHostile { .. }
        )
    }

    pub fn transport(&self) -> Option<&TransportMission> {
        match self {
            Mission::Transport(transport) => Some(transport),
            _ => None,
        }
    }

    pub fn transport_mut(&mut self) -> Option<&mut TransportMission> {
        match self {
            Mission::Transport(transport) => Some(transport),
            _ => None,
        }
    }

    /// Whether the mission still makes sense for `unit` in the current state.
    pub fn is_valid(&self, unit: &UnitSnapshot, snapshot: &AiSnapshot) -> bool {
        let own = unit.owner;
        match self {
            Mission::BuildColony { target } => {
                unit.is_person()
                    && snapshot
                        .nation(own)
                        .is_some_and(|nation| nation.can_found_settlements)
                    && snapshot.map.tile(*target).is_some_and(|tile| {
                        tile.is_land()
                            && tile.settlement.is_none()
                            && tile.owner.is_none_or(|owner| owner == own)
                    })
                    && snapshot.settlement_at(*target).is_none()
            }
            Mission::Pioneer { target } => {
                unit.is_person()
                    && snapshot
                        .map
                        .tile(*target)
                        .is_some_and(|tile| tile.is_land() && tile.owner.is_none_or(|o| o == own))
            }
            Mission::Scout { target } => {
                unit.is_person()
                    && (snapshot
                        .map
                        .tile(*target)
                        .is_some_and(|tile| tile.lost_city_rumour)
                        || snapshot.settlement_at(*target).is_some_and(|settlement| {
                            settlement.owner != own && !settlement.scouted_by.contains(&own)
                        }))
            }
            Mission::Transport(_) => unit.is_carrier() && !unit.damaged,
            Mission::DefendSettlement { settlement, .. } => {
                !unit.is_naval()
                    && snapshot
                        .settlement(*settlement)
                        .is_some_and(|settlement| settlement.owner == own)
            }
            Mission::SeekAndDestroy { target, .. } => {
                unit.is_offensive()
                    && match target {
                        HostileTarget::Unit(entity) => snapshot
                            .unit(*entity)
                            .is_some_and(|enemy| snapshot.at_war(own, enemy.owner)),
                        HostileTarget::Settlement(entity) => snapshot
                            .settlement(*entity)
                            .is_some_and(|enemy| snapshot.at_war(own, enemy.owner)),
                    }
            }
            Mission::WanderHostile { .. } => unit.is_offensive(),
            Mission::Missionary { settlement, .. } => {
                unit.is_person()
                    && snapshot.settlement(*settlement).is_some_and(|settlement| {
                        settlement.kind == SettlementKind::NativeCamp
                            && settlement.missionary.is_none()
                    })
            }
            Mission::WorkInsideColony { settlement, .. } => {
                unit.is_person()
                    && snapshot
                        .settlement(*settlement)
                        .is_some_and(|settlement| settlement.owner == own)
            }
            Mission::CashInTreasureTrain { .. } => unit.is_treasure_train(),
            Mission::IdleAtSettlement { .. } => true,
            Mission::WishRealization { wish, .. } => {
                unit.is_person()
                    && snapshot
                        .settlement(wish.settlement)
                        .is_some_and(|settlement| settlement.owner == own)
            }
            Mission::Privateer { prey, .. } => {
                unit.unit_type.is_naval_offensive()
                    && snapshot
                        .unit(*prey)
                        .is_some_and(|prey| prey.is_naval() && prey.owner != own)
            }
        }
    }
}
