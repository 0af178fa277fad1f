//! Ambush probability and danger level models.
use serde::{Deserialize, Serialize};

use crate::config::TravelConfig;
use crate::constants::{
    DANGER_DEPTH_WEIGHT, DANGER_EXHAUSTED_BONUS, DANGER_LEVEL_BUCKETS, DANGER_LEVEL_MAX,
    DANGER_NIGHT_BONUS, DANGER_STORM_BONUS, LOG_TARGET_PROBABILITY,
};
use crate::numbers::{floor_f64_to_u8_clamped, i64_to_f64};
use crate::world::{Biome, TilePos, WorldSnapshot};

/// Time-of-day and weather flags for one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TimeWeather {
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub storm: bool,
}

/// Danger level, always within `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct DangerLevel(u8);

impl DangerLevel {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(DANGER_LEVEL_MAX);

    /// Clamp `value` into the valid range.
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value > DANGER_LEVEL_MAX {
            Self(DANGER_LEVEL_MAX)
        } else {
            Self(value)
        }
    }

    /// `clamp(floor(score * 6), 0, 5)`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        Self(floor_f64_to_u8_clamped(
            score * DANGER_LEVEL_BUCKETS,
            DANGER_LEVEL_MAX,
        ))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for DangerLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > DANGER_LEVEL_MAX {
            return Err(format!("danger level {value} exceeds {DANGER_LEVEL_MAX}"));
        }
        Ok(Self(value))
    }
}

impl From<DangerLevel> for u8 {
    fn from(value: DangerLevel) -> Self {
        value.0
    }
}

/// Closest town or port to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestSettlement {
    pub pos: TilePos,
    pub distance: u32,
}

/// Full-grid scan for the closest settlement. Ties keep the first tile in
/// row-major order.
#[must_use]
pub fn nearest_town_port(world: &WorldSnapshot, from: TilePos) -> Option<NearestSettlement> {
    let mut best: Option<NearestSettlement> = None;
    for (pos, tile) in world.iter_tiles() {
        if !tile.tile_type.is_settlement() {
            continue;
        }
        let distance = pos.manhattan(from);
        if best.is_none_or(|current| distance < current.distance) {
            best = Some(NearestSettlement { pos, distance });
        }
    }
    best
}

/// Normalised Manhattan depth from spawn, clamped to `[0, 1]`.
#[must_use]
pub fn depth_norm(world: &WorldSnapshot, spawn: TilePos, pos: TilePos) -> f64 {
    let denom = i64::from(world.width - 1) + i64::from(world.height - 1);
    let denom = if denom <= 0 { 1 } else { denom };
    (f64::from(spawn.manhattan(pos)) / i64_to_f64(denom)).clamp(0.0, 1.0)
}

#[must_use]
pub fn safety_delta(cfg: &TravelConfig, dist_to_town: Option<u32>) -> f64 {
    match dist_to_town {
        Some(0 | 1) => cfg.safety.dist1,
        Some(2) => cfg.safety.dist2,
        Some(3) => cfg.safety.dist3,
        _ => 0.0,
    }
}

/// Bias from recent outcomes; `history` is ordered most-recent-last.
#[must_use]
pub fn streak_delta(cfg: &TravelConfig, history: &[bool]) -> f64 {
    if history.last().copied().unwrap_or(false) {
        return cfg.streak.after_ambush_reduction;
    }
    let calm_streak = history.len() >= 3 && history[history.len() - 3..].iter().all(|hit| !hit);
    if calm_streak {
        cfg.streak.no_ambush_3_bonus
    } else {
        0.0
    }
}

#[must_use]
pub fn time_delta(cfg: &TravelConfig, time_weather: TimeWeather) -> f64 {
    let night = if time_weather.night { cfg.night_bonus } else { 0.0 };
    let storm = if time_weather.storm { cfg.storm_bonus } else { 0.0 };
    night + storm
}

/// Everything the models read for one tile.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityInput<'a> {
    pub world: &'a WorldSnapshot,
    pub spawn: TilePos,
    pub pos: TilePos,
    pub biome: Biome,
    pub time_weather: TimeWeather,
    pub ambush_history: &'a [bool],
    pub stamina: i32,
}

/// Individual contributions to an ambush probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChanceBreakdown {
    pub dist_to_town: Option<u32>,
    pub nearest_town: Option<TilePos>,
    pub depth_norm: f64,
    pub biome: f64,
    pub safety: f64,
    pub depth: f64,
    pub time: f64,
    pub streak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbushChance {
    pub p: f64,
    pub breakdown: ChanceBreakdown,
}

/// `P = clamp(base + biome + safety + depth + time + streak, floor, ceil)`.
#[must_use]
pub fn compute_ambush_chance(cfg: &TravelConfig, input: &ProbabilityInput<'_>) -> AmbushChance {
    let nearest = nearest_town_port(input.world, input.pos);
    let dist_to_town = nearest.map(|n| n.distance);
    let depth_norm = depth_norm(input.world, input.spawn, input.pos);

    let breakdown = ChanceBreakdown {
        dist_to_town,
        nearest_town: nearest.map(|n| n.pos),
        depth_norm,
        biome: cfg.biome_prob_delta(input.biome),
        safety: safety_delta(cfg, dist_to_town),
        depth: cfg.depth_max_bonus.min(depth_norm * cfg.depth_max_bonus),
        time: time_delta(cfg, input.time_weather),
        streak: streak_delta(cfg, input.ambush_history),
    };
    let raw = cfg.p_base
        + breakdown.biome
        + breakdown.safety
        + breakdown.depth
        + breakdown.time
        + breakdown.streak;
    let p = raw.clamp(cfg.p_floor, cfg.p_ceil);
    log::debug!(
        target: LOG_TARGET_PROBABILITY,
        "ambush chance {p:.4} at {} (raw {raw:.4}, biome {})",
        input.pos,
        input.biome
    );
    AmbushChance { p, breakdown }
}

/// Danger score bucketed into six levels.
#[must_use]
pub fn compute_danger_level(cfg: &TravelConfig, input: &ProbabilityInput<'_>) -> DangerLevel {
    let depth = depth_norm(input.world, input.spawn, input.pos);
    let mut score = depth * DANGER_DEPTH_WEIGHT + cfg.biome_danger_weight(input.biome);
    if input.time_weather.night {
        score += DANGER_NIGHT_BONUS;
    }
    if input.time_weather.storm {
        score += DANGER_STORM_BONUS;
    }
    if input.stamina <= 0 {
        score += DANGER_EXHAUSTED_BONUS;
    }
    DangerLevel::from_score(score)
}
