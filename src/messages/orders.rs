use bevy::prelude::*;

use crate::ai::mission::{Mission, MissionKind};
use crate::ai::transport::TransportableId;
use crate::game::Location;

/// One mission step handed to the game for execution.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct MissionOrder {
    pub unit: Entity,
    pub kind: MissionKind,
    pub target: Option<Location>,
    /// Carriers only: what to pick up and where it goes, in delivery order.
    pub cargo: Vec<(TransportableId, Location)>,
}

impl MissionOrder {
    pub fn for_mission(unit: Entity, mission: &Mission) -> Self {
        let cargo = mission
            .transport()
            .map(|transport| {
                transport
                    .manifest()
                    .iter()
                    .map(|cargo| (cargo.transportable, cargo.destination))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            unit,
            kind: mission.kind(),
            target: mission.target(),
            cargo,
        }
    }
}
