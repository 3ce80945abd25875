//! Rust Colonization AI - strategic turn planning for computer-controlled colonial factions
//!
//! This library exposes the planning engine, the game roster it reads and the
//! messages it emits, for use by the game and for testing.

use bevy::app::PluginGroup;

use crate::ai::AiPlugin;
use crate::turn_system::TurnSystemPlugin;

pub mod ai;
pub mod constants;
pub mod game;
pub mod messages;
pub mod turn_system;

/// Plugin group for the turn cycle and the AI (headless-compatible)
pub struct LogicPlugins;

impl PluginGroup for LogicPlugins {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(TurnSystemPlugin)
            .add(AiPlugin)
    }
}

#[cfg(test)]
pub mod test_utils;
