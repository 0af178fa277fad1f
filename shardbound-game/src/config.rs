//! Travel and encounter tuning knobs.
//!
//! Every field has a serde default so partial JSON overlays load cleanly.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{
    AMBUSH_HISTORY_WINDOW, DANGER_LEVEL_MAX, DEFAULT_MAX_STAMINA, UNKNOWN_BIOME_DANGER_WEIGHT,
};
use crate::rng::RngAlgo;
use crate::world::{Biome, TileType};

/// Errors raised when travel configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("probability floor {floor:.2} exceeds ceiling {ceil:.2}")]
    FloorAboveCeiling { floor: f64, ceil: f64 },
    #[error("ambush group size for danger level {danger_level} invalid (min {min} > max {max} or min 0)")]
    GroupSize { danger_level: u8, min: u8, max: u8 },
}

/// Stamina budget and costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaConfig {
    #[serde(default = "StaminaConfig::default_max")]
    pub max: i32,
    #[serde(default = "StaminaConfig::default_cost")]
    pub cost_travel: i32,
    #[serde(default = "StaminaConfig::default_cost")]
    pub cost_room: i32,
    #[serde(default = "StaminaConfig::default_field_rest_recovery")]
    pub field_rest_recovery: i32,
}

impl StaminaConfig {
    const fn default_max() -> i32 {
        DEFAULT_MAX_STAMINA
    }

    const fn default_cost() -> i32 {
        1
    }

    const fn default_field_rest_recovery() -> i32 {
        20
    }
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: Self::default_max(),
            cost_travel: Self::default_cost(),
            cost_room: Self::default_cost(),
            field_rest_recovery: Self::default_field_rest_recovery(),
        }
    }
}

/// Anti-frustration bias from recent ambush outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "StreakConfig::default_no_ambush_3_bonus")]
    pub no_ambush_3_bonus: f64,
    #[serde(default = "StreakConfig::default_after_ambush_reduction")]
    pub after_ambush_reduction: f64,
}

impl StreakConfig {
    const fn default_no_ambush_3_bonus() -> f64 {
        0.03
    }

    const fn default_after_ambush_reduction() -> f64 {
        -0.05
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            no_ambush_3_bonus: Self::default_no_ambush_3_bonus(),
            after_ambush_reduction: Self::default_after_ambush_reduction(),
        }
    }
}

/// Probability deltas by Manhattan distance to the nearest settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "SafetyConfig::default_dist1")]
    pub dist1: f64,
    #[serde(default = "SafetyConfig::default_dist2")]
    pub dist2: f64,
    #[serde(default = "SafetyConfig::default_dist3")]
    pub dist3: f64,
}

impl SafetyConfig {
    const fn default_dist1() -> f64 {
        -0.08
    }

    const fn default_dist2() -> f64 {
        -0.04
    }

    const fn default_dist3() -> f64 {
        -0.02
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dist1: Self::default_dist1(),
            dist2: Self::default_dist2(),
            dist3: Self::default_dist3(),
        }
    }
}

/// Inclusive `[min, max]` enemy count for one danger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSize(pub u8, pub u8);

impl GroupSize {
    #[must_use]
    pub const fn min(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn max(self) -> u8 {
        self.1
    }
}

/// Complete travel/ambush configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    #[serde(default = "TravelConfig::default_p_base")]
    pub p_base: f64,
    #[serde(default = "TravelConfig::default_p_floor")]
    pub p_floor: f64,
    #[serde(default = "TravelConfig::default_p_ceil")]
    pub p_ceil: f64,
    #[serde(default)]
    pub stamina: StaminaConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default = "TravelConfig::default_depth_max_bonus")]
    pub depth_max_bonus: f64,
    #[serde(default = "TravelConfig::default_night_bonus")]
    pub night_bonus: f64,
    #[serde(default = "TravelConfig::default_storm_bonus")]
    pub storm_bonus: f64,
    #[serde(default = "TravelConfig::default_group_sizes")]
    pub ambush_group_by_dl: [GroupSize; 6],
    #[serde(default = "TravelConfig::default_biome_prob_delta")]
    pub biome_prob_delta: BTreeMap<Biome, f64>,
    #[serde(default = "TravelConfig::default_biome_danger_weight")]
    pub biome_danger_weight: BTreeMap<Biome, f64>,
    #[serde(default = "TravelConfig::default_slice_tile_types")]
    pub slice_tile_types: Vec<TileType>,
    #[serde(default = "TravelConfig::default_ambush_history_window")]
    pub ambush_history_window: usize,
    #[serde(default)]
    pub rng_algo: RngAlgo,
}

impl TravelConfig {
    const fn default_p_base() -> f64 {
        0.15
    }

    const fn default_p_floor() -> f64 {
        0.05
    }

    const fn default_p_ceil() -> f64 {
        0.45
    }

    const fn default_depth_max_bonus() -> f64 {
        0.07
    }

    const fn default_night_bonus() -> f64 {
        0.03
    }

    const fn default_storm_bonus() -> f64 {
        0.03
    }

    const fn default_ambush_history_window() -> usize {
        AMBUSH_HISTORY_WINDOW
    }

    const fn default_group_sizes() -> [GroupSize; 6] {
        [
            GroupSize(1, 1),
            GroupSize(1, 1),
            GroupSize(1, 2),
            GroupSize(2, 2),
            GroupSize(2, 3),
            GroupSize(3, 3),
        ]
    }

    fn default_biome_prob_delta() -> BTreeMap<Biome, f64> {
        BTreeMap::from([
            (Biome::Plains, 0.00),
            (Biome::Forest, 0.05),
            (Biome::Desert, 0.07),
            (Biome::Tropical, 0.05),
            (Biome::Tundra, 0.06),
            (Biome::Mountains, 0.08),
            (Biome::VolcanicRim, 0.10),
            (Biome::Coast, 0.02),
            (Biome::Beach, 0.02),
            (Biome::Wetlands, 0.07),
            (Biome::Bog, 0.07),
        ])
    }

    fn default_biome_danger_weight() -> BTreeMap<Biome, f64> {
        BTreeMap::from([
            (Biome::Plains, 0.05),
            (Biome::Forest, 0.15),
            (Biome::Desert, 0.20),
            (Biome::Tropical, 0.18),
            (Biome::Tundra, 0.20),
            (Biome::Mountains, 0.25),
            (Biome::VolcanicRim, 0.30),
            (Biome::Wetlands, 0.22),
            (Biome::Coast, 0.10),
            (Biome::Beach, 0.10),
        ])
    }

    fn default_slice_tile_types() -> Vec<TileType> {
        vec![
            TileType::Town,
            TileType::Port,
            TileType::Ruins,
            TileType::Dungeon,
            TileType::DenseForest,
            TileType::Cave,
            TileType::VolcanicRim,
        ]
    }

    /// Load a configuration overlay from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Probability delta for `biome`; unlisted biomes contribute nothing.
    #[must_use]
    pub fn biome_prob_delta(&self, biome: Biome) -> f64 {
        self.biome_prob_delta.get(&biome).copied().unwrap_or(0.0)
    }

    /// Danger weight for `biome`; unlisted biomes get a small positive weight.
    #[must_use]
    pub fn biome_danger_weight(&self, biome: Biome) -> f64 {
        self.biome_danger_weight
            .get(&biome)
            .copied()
            .unwrap_or(UNKNOWN_BIOME_DANGER_WEIGHT)
    }

    #[must_use]
    pub fn group_size(&self, danger_level: u8) -> GroupSize {
        let idx = usize::from(danger_level.min(DANGER_LEVEL_MAX));
        self.ambush_group_by_dl
            .get(idx)
            .copied()
            .unwrap_or(GroupSize(1, 1))
    }

    #[must_use]
    pub fn is_slice_tile(&self, tile_type: TileType) -> bool {
        self.slice_tile_types.contains(&tile_type)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_unit("p_base", self.p_base)?;
        validate_unit("p_floor", self.p_floor)?;
        validate_unit("p_ceil", self.p_ceil)?;
        if self.p_floor > self.p_ceil {
            return Err(ConfigError::FloorAboveCeiling {
                floor: self.p_floor,
                ceil: self.p_ceil,
            });
        }
        validate_min("stamina.max", self.stamina.max, 1)?;
        validate_min("stamina.cost_travel", self.stamina.cost_travel, 0)?;
        validate_min("stamina.cost_room", self.stamina.cost_room, 0)?;
        validate_min(
            "stamina.field_rest_recovery",
            self.stamina.field_rest_recovery,
            0,
        )?;
        if self.ambush_history_window < 3 {
            return Err(ConfigError::MinViolation {
                field: "ambush_history_window",
                min: 3,
                value: i64::try_from(self.ambush_history_window).unwrap_or(i64::MAX),
            });
        }
        for (danger_level, size) in (0_u8..).zip(self.ambush_group_by_dl.iter()) {
            if size.min() == 0 || size.min() > size.max() {
                return Err(ConfigError::GroupSize {
                    danger_level,
                    min: size.min(),
                    max: size.max(),
                });
            }
        }
        Ok(())
    }
}

fn validate_min(field: &'static str, value: i32, min: i32) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation {
            field,
            min: i64::from(min),
            value: i64::from(value),
        });
    }
    Ok(())
}

fn validate_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::RangeViolation {
            field,
            min: 0.0,
            max: 1.0,
            value,
        });
    }
    Ok(())
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            p_base: Self::default_p_base(),
            p_floor: Self::default_p_floor(),
            p_ceil: Self::default_p_ceil(),
            stamina: StaminaConfig::default(),
            streak: StreakConfig::default(),
            safety: SafetyConfig::default(),
            depth_max_bonus: Self::default_depth_max_bonus(),
            night_bonus: Self::default_night_bonus(),
            storm_bonus: Self::default_storm_bonus(),
            ambush_group_by_dl: Self::default_group_sizes(),
            biome_prob_delta: Self::default_biome_prob_delta(),
            biome_danger_weight: Self::default_biome_danger_weight(),
            slice_tile_types: Self::default_slice_tile_types(),
            ambush_history_window: Self::default_ambush_history_window(),
            rng_algo: RngAlgo::default(),
        }
    }
}
