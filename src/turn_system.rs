use bevy::prelude::*;

use crate::constants::{EARLY_AGE_LAST_TURN, MIDDLE_AGE_LAST_TURN};

#[derive(Resource, Debug, Clone)]
pub struct TurnSystem {
    pub current_turn: u32,
    pub phase: TurnPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    PlayerTurn,
    Processing,
    EnemyTurn,
}

impl Default for TurnSystem {
    fn default() -> Self {
        Self {
            current_turn: 1,
            phase: TurnPhase::PlayerTurn,
        }
    }
}

impl TurnSystem {
    pub fn advance_turn(&mut self) {
        match self.phase {
            TurnPhase::PlayerTurn => self.phase = TurnPhase::Processing,
            TurnPhase::Processing => self.phase = TurnPhase::EnemyTurn,
            TurnPhase::EnemyTurn => {
                self.current_turn += 1;
                self.phase = TurnPhase::PlayerTurn;
            }
        }
    }

    pub fn end_player_turn(&mut self) {
        if self.phase == TurnPhase::PlayerTurn {
            self.phase = TurnPhase::Processing;
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.phase == TurnPhase::PlayerTurn
    }

    /// Historical age: 1 for discovery, 2 for the colonial era, 3 afterwards.
    pub fn age(&self) -> u8 {
        match self.current_turn {
            ..=EARLY_AGE_LAST_TURN => 1,
            ..=MIDDLE_AGE_LAST_TURN => 2,
            _ => 3,
        }
    }
}

pub struct TurnSystemPlugin;

impl Plugin for TurnSystemPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TurnSystem>()
            .add_systems(PreUpdate, begin_enemy_turn)
            .add_systems(PostUpdate, finish_enemy_turn);
    }
}

/// Moves from processing into the enemy phase so AI systems see it during `Update`.
fn begin_enemy_turn(mut turn_system: ResMut<TurnSystem>) {
    if turn_system.phase == TurnPhase::Processing {
        turn_system.advance_turn();
        debug!("Enemy phase of turn {}", turn_system.current_turn);
    }
}

fn finish_enemy_turn(mut turn_system: ResMut<TurnSystem>) {
    if turn_system.phase == TurnPhase::EnemyTurn {
        turn_system.advance_turn();
        info!("=== Turn {} ===", turn_system.current_turn);
    }
}
