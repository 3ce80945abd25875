use bevy::prelude::*;

/// Marks a nation entity that should be driven by the AI turn systems.
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AiNation;
