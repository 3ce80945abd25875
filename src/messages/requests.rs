use bevy::prelude::*;

use crate::game::{GoodsType, NationId, Stance, UnitRole, UnitType};

/// Remote actions the AI asks the game to carry out.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum ActionRequest {
    /// Change a unit's role, buying the equipment it needs.
    Equip { unit: Entity, role: UnitRole },
    /// Buy the next recruit waiting on the docks.
    Recruit { nation: NationId },
    Train { nation: NationId, unit_type: UnitType },
    Emigrate { nation: NationId },
    ChangeStance {
        nation: NationId,
        towards: NationId,
        stance: Stance,
    },
    /// Hand goods from a colony to a native settlement.
    Gift {
        colony: Entity,
        settlement: Entity,
        goods: GoodsType,
        amount: u32,
    },
    /// Have an armed unit demand tribute from the settlement next to it.
    DemandTribute { unit: Entity, settlement: Entity },
}
