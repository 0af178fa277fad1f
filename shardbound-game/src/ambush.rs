//! Ambush resolution.
//!
//! An attempt moves `Idle → Rolling → (NoTrigger | Resolving) → Done`. The
//! roll and the enemy group are drawn in [`begin_ambush`]; a triggered ambush
//! is returned as a [`PendingAmbush`] that holds the player state mutably until
//! the combat collaborator reports back through [`PendingAmbush::resolve`].
//! Dropping a pending ambush without resolving it forfeits the fight and
//! applies the defeat consequences.
use serde::Serialize;

use crate::config::TravelConfig;
use crate::constants::{LABEL_LOOT, LABEL_MOBS, LABEL_PENALTY, LABEL_ROLL, LOG_TARGET_AMBUSH};
use crate::encounters::{EnemyGroup, EnemySpec, GroupRequest, build_enemy_group};
use crate::hash_seed::ambush_seed;
use crate::loot::{ItemId, LootContext, LootRoll, roll_loot};
use crate::player::PlayerTravelState;
use crate::probability::{
    AmbushChance, DangerLevel, ProbabilityInput, TimeWeather, compute_ambush_chance,
    compute_danger_level, nearest_town_port,
};
use crate::rng::RngStream;
use crate::world::{Biome, TilePos, WorldSnapshot};

/// Where an ambush attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbushPhase {
    Idle,
    Rolling,
    NoTrigger,
    Resolving,
    Done,
}

/// Side effects of one resolved attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmbushOutcome {
    Victory {
        enemies: EnemyGroup,
        loot: Vec<LootRoll>,
    },
    Defeat {
        enemies: EnemyGroup,
        lost_item: Option<ItemId>,
        respawn: TilePos,
    },
    NoEnemy,
}

impl AmbushOutcome {
    #[must_use]
    pub const fn is_defeat(&self) -> bool {
        matches!(self, Self::Defeat { .. })
    }

    #[must_use]
    pub fn enemies(&self) -> &[EnemySpec] {
        match self {
            Self::Victory { enemies, .. } | Self::Defeat { enemies, .. } => enemies,
            Self::NoEnemy => &[],
        }
    }
}

/// What the combat collaborator reports once a fight ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombatReport {
    pub victory: bool,
}

/// Blocking combat collaborator.
pub trait CombatResolver {
    fn engage(&mut self, enemies: &[EnemySpec]) -> CombatReport;
}

impl<F> CombatResolver for F
where
    F: FnMut(&[EnemySpec]) -> bool,
{
    fn engage(&mut self, enemies: &[EnemySpec]) -> CombatReport {
        CombatReport {
            victory: self(enemies),
        }
    }
}

/// Combat collaborator that suspends until the fight is over.
#[cfg(feature = "async")]
pub trait AsyncCombat {
    fn engage(
        &mut self,
        enemies: Vec<EnemySpec>,
    ) -> impl std::future::Future<Output = CombatReport>;
}

/// Inputs for one ambush attempt at the move target.
#[derive(Debug, Clone, Copy)]
pub struct AmbushRequest<'a> {
    pub world: &'a WorldSnapshot,
    pub config: &'a TravelConfig,
    pub target: TilePos,
    pub biome: Biome,
    pub time_weather: TimeWeather,
}

/// Result of the trigger roll.
pub enum AmbushStart<'p> {
    /// The roll did not beat the ambush chance; the player has already moved.
    NoTrigger {
        chance: AmbushChance,
        danger_level: DangerLevel,
        roll: f64,
    },
    /// The roll also produced no enemies; treated like a calm move.
    NoEnemy {
        chance: AmbushChance,
        danger_level: DangerLevel,
        roll: f64,
    },
    Triggered(PendingAmbush<'p>),
}

impl AmbushStart<'_> {
    #[must_use]
    pub const fn phase(&self) -> AmbushPhase {
        match self {
            Self::NoTrigger { .. } | Self::NoEnemy { .. } => AmbushPhase::NoTrigger,
            Self::Triggered(pending) => pending.phase,
        }
    }
}

/// A triggered ambush awaiting the combat result.
pub struct PendingAmbush<'p> {
    player: &'p mut PlayerTravelState,
    chance: AmbushChance,
    danger_level: DangerLevel,
    biome: Biome,
    roll: f64,
    enemies: EnemyGroup,
    target: TilePos,
    respawn: TilePos,
    history_window: usize,
    loot_stream: RngStream,
    penalty_stream: RngStream,
    phase: AmbushPhase,
}

/// Roll for an ambush at `request.target` and, when triggered, build the
/// enemy group. Every stream is derived from the tile/player ambush seed so
/// replays reproduce the same decisions.
pub fn begin_ambush<'p>(
    request: &AmbushRequest<'_>,
    player: &'p mut PlayerTravelState,
) -> AmbushStart<'p> {
    let input = ProbabilityInput {
        world: request.world,
        spawn: request.world.spawn,
        pos: request.target,
        biome: request.biome,
        time_weather: request.time_weather,
        ambush_history: &player.ambush_history,
        stamina: player.stamina,
    };
    let chance = compute_ambush_chance(request.config, &input);
    let danger_level = compute_danger_level(request.config, &input);

    let seed = ambush_seed(
        request.world.world_seed,
        &request.world.shard_id,
        request.target.x,
        request.target.y,
        &player.player_id,
    );
    let root = RngStream::from_seed(seed, request.config.rng_algo);
    let roll = root.derive(LABEL_ROLL).float();
    log::debug!(
        target: LOG_TARGET_AMBUSH,
        "rolling at {}: {roll:.4} vs chance {:.4}",
        request.target,
        chance.p
    );
    let window = request.config.ambush_history_window;

    if roll >= chance.p {
        player.position = request.target;
        player.push_ambush_result(false, window);
        return AmbushStart::NoTrigger {
            chance,
            danger_level,
            roll,
        };
    }

    let group_request = GroupRequest {
        config: request.config,
        danger_level,
        biome: request.biome,
    };
    let enemies = build_enemy_group(&group_request, &mut root.derive(LABEL_MOBS));
    if enemies.is_empty() {
        log::warn!(
            target: LOG_TARGET_AMBUSH,
            "ambush at {} produced no enemies; continuing without combat",
            request.target
        );
        player.position = request.target;
        player.push_ambush_result(false, window);
        return AmbushStart::NoEnemy {
            chance,
            danger_level,
            roll,
        };
    }

    let respawn = nearest_town_port(request.world, request.target)
        .map_or(request.world.spawn, |nearest| nearest.pos);
    AmbushStart::Triggered(PendingAmbush {
        player,
        chance,
        danger_level,
        biome: request.biome,
        roll,
        enemies,
        target: request.target,
        respawn,
        history_window: window,
        loot_stream: root.derive(LABEL_LOOT),
        penalty_stream: root.derive(LABEL_PENALTY),
        phase: AmbushPhase::Resolving,
    })
}

impl PendingAmbush<'_> {
    #[must_use]
    pub fn enemies(&self) -> &[EnemySpec] {
        &self.enemies
    }

    #[must_use]
    pub const fn danger_level(&self) -> DangerLevel {
        self.danger_level
    }

    #[must_use]
    pub const fn chance(&self) -> &AmbushChance {
        &self.chance
    }

    #[must_use]
    pub const fn roll(&self) -> f64 {
        self.roll
    }

    #[must_use]
    pub const fn phase(&self) -> AmbushPhase {
        self.phase
    }

    /// Apply the combat result and finish the attempt.
    pub fn resolve(mut self, report: CombatReport) -> AmbushOutcome {
        let outcome = if report.victory {
            self.apply_victory()
        } else {
            self.apply_defeat()
        };
        log::info!(
            target: LOG_TARGET_AMBUSH,
            "ambush at {} resolved: {} with {} enemies",
            self.target,
            if report.victory { "victory" } else { "defeat" },
            outcome.enemies().len()
        );
        outcome
    }

    /// Give up the fight; resolves as a defeat.
    pub fn forfeit(mut self) -> AmbushOutcome {
        log::warn!(target: LOG_TARGET_AMBUSH, "ambush at {} forfeited", self.target);
        self.apply_defeat()
    }

    fn apply_victory(&mut self) -> AmbushOutcome {
        self.phase = AmbushPhase::Done;
        let enemies = std::mem::take(&mut self.enemies);
        let mut loot = Vec::with_capacity(enemies.len());
        for _ in &enemies {
            let roll = roll_loot(
                self.danger_level,
                self.biome,
                LootContext::Ambush,
                &mut self.loot_stream,
            );
            self.player.add_item(&roll.item_id, 1);
            loot.push(roll);
        }
        self.player.position = self.target;
        self.player.push_ambush_result(true, self.history_window);
        AmbushOutcome::Victory { enemies, loot }
    }

    fn apply_defeat(&mut self) -> AmbushOutcome {
        self.phase = AmbushPhase::Done;
        let enemies = std::mem::take(&mut self.enemies);
        self.player.respawn_at(self.respawn);
        let lost_item = self.player.lose_random_non_rare(&mut self.penalty_stream);
        self.player.push_ambush_result(true, self.history_window);
        AmbushOutcome::Defeat {
            enemies,
            lost_item,
            respawn: self.respawn,
        }
    }
}

impl Drop for PendingAmbush<'_> {
    fn drop(&mut self) {
        if self.phase == AmbushPhase::Done {
            return;
        }
        log::warn!(
            target: LOG_TARGET_AMBUSH,
            "pending ambush at {} dropped before combat resolved; applying defeat",
            self.target
        );
        self.apply_defeat();
    }
}
