use bevy::prelude::*;

use crate::ai::improvements::TileImprovementPlan;
use crate::ai::wishes::Wish;

/// Demand and improvement proposals raised by a settlement's own planning.
///
/// Settlement logic owns and rewrites this every turn; the planner only reads it.
#[derive(Component, Debug, Clone, Default)]
pub struct AiColony {
    pub wishes: Vec<Wish>,
    pub improvement_plans: Vec<TileImprovementPlan>,
}
