use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Tunables for the AI planner. Defaults come from [`crate::constants`].
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub building_range: u32,
    pub cash_in_range: u32,
    pub missionary_range: u32,
    pub pioneering_range: u32,
    pub scouting_range: u32,
    pub privateer_range: u32,
    pub seek_and_destroy_range: u32,
    pub seek_and_destroy_extended_range: u32,
    pub max_planning_passes: usize,
    pub urgent_fraction_divisor: usize,
    pub urgent_floor: usize,
    pub min_settlements_to_trade: usize,
    pub min_units_to_trade: usize,
    pub give_up_threshold: u32,
    /// Chance in percent that a treaty survives each turn.
    pub peace_probability: u32,
    pub gift_range: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            building_range: BUILDING_RANGE,
            cash_in_range: CASH_IN_RANGE,
            missionary_range: MISSIONARY_RANGE,
            pioneering_range: PIONEERING_RANGE,
            scouting_range: SCOUTING_RANGE,
            privateer_range: PRIVATEER_RANGE,
            seek_and_destroy_range: SEEK_AND_DESTROY_RANGE,
            seek_and_destroy_extended_range: SEEK_AND_DESTROY_EXTENDED_RANGE,
            max_planning_passes: MAX_PLANNING_PASSES,
            urgent_fraction_divisor: URGENT_FRACTION_DIVISOR,
            urgent_floor: URGENT_FLOOR,
            min_settlements_to_trade: MIN_SETTLEMENTS_TO_TRADE,
            min_units_to_trade: MIN_UNITS_TO_TRADE,
            give_up_threshold: GIVE_UP_THRESHOLD,
            peace_probability: PEACE_PROBABILITY,
            gift_range: GIFT_RANGE,
        }
    }
}
