//! Centralized balance and tuning constants for the Shardbound encounter core.
//!
//! These values define the deterministic math for the simulation. Anything a
//! designer may retune per shard lives in [`crate::config::TravelConfig`];
//! the values here are fixed by the seeding contract or the danger model and
//! only change through reviewed code.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SEED: &str = "shardbound::seed";
pub(crate) const LOG_TARGET_PROBABILITY: &str = "shardbound::probability";
pub(crate) const LOG_TARGET_AMBUSH: &str = "shardbound::ambush";
pub(crate) const LOG_TARGET_LOOT: &str = "shardbound::loot";
pub(crate) const LOG_TARGET_TRAVEL: &str = "shardbound::travel";

// Hashing ------------------------------------------------------------------
pub(crate) const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
pub(crate) const FNV_PRIME: u32 = 0x0100_0193;
pub(crate) const TILE_HASH_X_PRIME: i32 = 73_856_093;
pub(crate) const TILE_HASH_Y_PRIME: i32 = 19_349_663;

// Seed scopes --------------------------------------------------------------
pub(crate) const SCOPE_AMBUSH: &str = "AMBUSH";
pub(crate) const SCOPE_LOOT: &str = "LOOT";
pub(crate) const LABEL_ROLL: &str = "roll";
pub(crate) const LABEL_MOBS: &str = "mobs";
pub(crate) const LABEL_LOOT: &str = "loot";
pub(crate) const LABEL_PENALTY: &str = "penalty";

// PRNG cores ---------------------------------------------------------------
pub(crate) const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
pub(crate) const SPLITMIX_GAMMA: u32 = 0x9E37_79B9;
pub(crate) const SPLITMIX_MIX_A: u32 = 0x85EB_CA6B;
pub(crate) const SPLITMIX_MIX_B: u32 = 0xC2B2_AE35;
pub(crate) const UNIT_DIVISOR: f64 = 4_294_967_296.0;
pub(crate) const POISSON_KNUTH_LIMIT: f64 = 30.0;

// Danger model -------------------------------------------------------------
pub(crate) const DANGER_LEVEL_MAX: u8 = 5;
pub(crate) const DANGER_LEVEL_BUCKETS: f64 = 6.0;
pub(crate) const DANGER_DEPTH_WEIGHT: f64 = 0.5;
pub(crate) const DANGER_NIGHT_BONUS: f64 = 0.03;
pub(crate) const DANGER_STORM_BONUS: f64 = 0.02;
pub(crate) const DANGER_EXHAUSTED_BONUS: f64 = 0.05;
pub(crate) const UNKNOWN_BIOME_DANGER_WEIGHT: f64 = 0.05;

// Player defaults ----------------------------------------------------------
pub(crate) const DEFAULT_MAX_HP: i32 = 100;
pub(crate) const DEFAULT_REST_ITEMS: u32 = 2;
pub(crate) const FIELD_RATION_HP_RATIO: f64 = 0.2;
pub(crate) const DEFAULT_PLAYER_ID: &str = "localDevPlayer";
pub(crate) const DEFAULT_MAX_STAMINA: i32 = 100;
pub(crate) const AMBUSH_HISTORY_WINDOW: usize = 5;
