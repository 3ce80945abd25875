//! Per-turn strategic planning for computer-controlled colonial factions.

use bevy::prelude::*;

use crate::game::GameMap;
use crate::messages::{ActionRequest, MissionOrder, TradeProposal, TradeResponse};
use crate::turn_system::{TurnPhase, TurnSystem};

pub mod colony;
pub mod config;
pub mod decisions;
pub mod diplomacy;
pub mod error;
pub mod execute;
pub mod improvements;
pub mod intelligence;
pub mod markers;
pub mod mission;
pub mod oracle;
pub mod orchestrator;
pub mod pathfinding;
pub mod planner;
pub mod player;
pub mod relations;
pub mod snapshot;
pub mod transport;
pub mod wishes;

pub use colony::AiColony;
pub use config::AiConfig;
pub use error::AiError;
pub use execute::{attach_ai_players, respond_to_trade_proposals, run_ai_turns};
pub use markers::AiNation;
pub use mission::{Mission, MissionKind};
pub use orchestrator::{Collaborators, TurnOrchestrator, TurnReport};
pub use player::AiPlayer;
pub use snapshot::{AiSnapshot, build_ai_snapshot};

/// True on the first frame of each enemy phase.
pub fn enemy_turn_entered(mut planned: Local<Option<u32>>, turn: Res<TurnSystem>) -> bool {
    if turn.phase != TurnPhase::EnemyTurn || *planned == Some(turn.current_turn) {
        return false;
    }
    *planned = Some(turn.current_turn);
    true
}

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AiSnapshot>()
            .init_resource::<AiConfig>()
            .init_resource::<oracle::EuropeanMarket>()
            .init_resource::<GameMap>()
            .add_message::<MissionOrder>()
            .add_message::<ActionRequest>()
            .add_message::<TradeProposal>()
            .add_message::<TradeResponse>()
            .add_systems(
                Update,
                (attach_ai_players, build_ai_snapshot, run_ai_turns)
                    .chain()
                    .run_if(enemy_turn_entered),
            )
            .add_systems(Update, respond_to_trade_proposals);
    }
}
