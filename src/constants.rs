//! Planning constants and default tunables
//!
//! Defaults for [`crate::ai::config::AiConfig`] and the turn calendar live here.

// ============================================================================
// MISSION SEARCH RANGES (turns)
// ============================================================================

/// Maximum travel time for a unit sent to found a settlement
pub const BUILDING_RANGE: u32 = 5;

/// Maximum travel time for a treasure train heading to a port
pub const CASH_IN_RANGE: u32 = 20;

pub const MISSIONARY_RANGE: u32 = 20;

pub const PIONEERING_RANGE: u32 = 10;

pub const SCOUTING_RANGE: u32 = 20;

pub const PRIVATEER_RANGE: u32 = 8;

/// Range for hunting hostile targets nearby
pub const SEEK_AND_DESTROY_RANGE: u32 = 8;

/// Range for the second, longer hunt when nothing else applies
pub const SEEK_AND_DESTROY_EXTENDED_RANGE: u32 = 16;

// ============================================================================
// PLANNING LOOP
// ============================================================================

/// Plan/execute passes per turn
pub const MAX_PLANNING_PASSES: usize = 3;

/// Share of the transport supply treated as urgent (one in N)
pub const URGENT_FRACTION_DIVISOR: usize = 10;

/// Minimum number of urgent transportables
pub const URGENT_FLOOR: usize = 2;

// ============================================================================
// UNIT SCORING
// ============================================================================

/// Suitability score of a unit that can never take the mission
pub const UNSUITABLE_SCORE: i32 = -1000;

/// Base score of a defend target before garrison penalties
pub const DEFEND_BASE_SCORE: i32 = 100;

/// Penalty per defender already present
pub const DEFENDER_PENALTY: i32 = 25;

/// Penalty per stockade level when the garrison already exceeds it
pub const OVER_GARRISON_PENALTY: i32 = 100;

/// Penalty per stockade level otherwise
pub const FORTIFIED_PENALTY: i32 = 20;

pub const RUMOUR_VALUE: u32 = 1000;
pub const UNSCOUTED_SETTLEMENT_VALUE: u32 = 600;
pub const MISSION_SITE_VALUE: u32 = 1000;
pub const HOSTILE_SETTLEMENT_VALUE: u32 = 1000;
pub const HOSTILE_UNIT_VALUE: u32 = 500;
pub const PREY_VALUE: u32 = 1000;

// ============================================================================
// DIPLOMACY
// ============================================================================

/// Settlements a faction must hold before trading one away
pub const MIN_SETTLEMENTS_TO_TRADE: usize = 5;

/// Units a faction must hold before trading one away
pub const MIN_UNITS_TO_TRADE: usize = 10;

/// Bargaining die result above which the AI gives up
pub const GIVE_UP_THRESHOLD: u32 = 5;

pub const INCITE_SCALE: f64 = 30.0;
pub const STANCE_SCALE: f64 = 100.0;

/// Score of peace offered to a much weaker faction
pub const PEACE_WHEN_WEAK_SCORE: i64 = 1000;

/// Appraisal of a foreign settlement
pub const FOREIGN_UNIT_VALUE: i64 = 1000;
pub const FOREIGN_SETTLEMENT_BASE_VALUE: i64 = 500;
pub const FOREIGN_OWNED_TILE_VALUE: i64 = 200;

// ============================================================================
// STANCES AND TENSION
// ============================================================================

/// Tension at or below which a cease fire becomes peace
pub const TENSION_HAPPY: u32 = 100;

/// Tension at or below which a war cools into a cease fire
pub const TENSION_CONTENT: u32 = 600;

/// Tension at which natives are worth placating with gifts
pub const TENSION_DISPLEASED: u32 = 700;

/// Tension at or above which any stance turns to war
pub const TENSION_HATEFUL: u32 = 1000;

/// Chance in percent that a treaty survives one more turn
pub const PEACE_PROBABILITY: u32 = 90;

/// Travel time within which a colony brings gifts to a native camp
pub const GIFT_RANGE: u32 = 4;

/// Goods handed over in one gift
pub const GIFT_AMOUNT: u32 = 100;

/// Strength share above which the AI dares to demand tribute
pub const TRIBUTE_STRENGTH_RATIO: f64 = 0.66;

// ============================================================================
// TRANSPORT
// ============================================================================

/// Sailing time between Europe and the coast
pub const EUROPE_SAILING_TURNS: u32 = 3;

/// Goods per hold
pub const GOODS_PER_HOLD: u32 = 100;

// ============================================================================
// ROLE EQUIPMENT
// ============================================================================

pub const SCOUT_HORSES: u32 = 50;
pub const PIONEER_TOOLS: u32 = 20;
pub const ROLE_PRICE_IN_EUROPE: i64 = 300;

// ============================================================================
// CALENDAR
// ============================================================================

/// Last turn of the discovery age
pub const EARLY_AGE_LAST_TURN: u32 = 108;

/// Last turn of the colonial age
pub const MIDDLE_AGE_LAST_TURN: u32 = 308;

// ============================================================================
// RANDOMNESS
// ============================================================================

/// Base seed for per-faction AI randomness
pub const AI_RNG_SEED: u64 = 0x00C0_1015_7A7E_0001;
