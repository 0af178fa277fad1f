//! Cardinal travel across a shard.
//!
//! A move validates the direction and bounds, spends stamina, then runs the
//! ambush attempt for the target tile. Failures leave the player untouched.
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ambush::{
    AmbushOutcome, AmbushRequest, AmbushStart, CombatReport, CombatResolver, PendingAmbush,
    begin_ambush,
};
use crate::config::{ConfigError, TravelConfig};
use crate::constants::LOG_TARGET_TRAVEL;
use crate::encounters::EnemySpec;
use crate::player::PlayerTravelState;
use crate::probability::{AmbushChance, DangerLevel, TimeWeather};
use crate::world::{Biome, TilePos, TileType, WorldSnapshot};

/// Recoverable move failures; the player state is unchanged when returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TravelError {
    #[error("unknown direction `{0}`")]
    BadDir(String),
    #[error("target ({x},{y}) is outside the shard")]
    OutOfBounds { x: i32, y: i32 },
    #[error("not enough stamina ({stamina} available, {cost} needed)")]
    NoStamina { stamina: i32, cost: i32 },
}

impl TravelError {
    /// Stable reason code for callers that match on strings.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadDir(_) => "BAD_DIR",
            Self::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            Self::NoStamina { .. } => "NO_STAMINA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Grid offset; north decreases `y`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Accepts exactly the tokens [`Direction::token`] produces. Case, padding and
/// spelled-out names are rejected.
impl FromStr for Direction {
    type Err = TravelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.token() == s)
            .ok_or_else(|| TravelError::BadDir(s.to_string()))
    }
}

/// Slice entrance reached by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceTrigger {
    pub pos: TilePos,
    pub biome: Biome,
    pub tile_type: TileType,
}

/// One-way notification that a slice should be entered.
pub trait SliceEntry {
    fn enter_slice(&mut self, trigger: &SliceTrigger);
}

impl<F> SliceEntry for F
where
    F: FnMut(&SliceTrigger),
{
    fn enter_slice(&mut self, trigger: &SliceTrigger) {
        self(trigger);
    }
}

/// Everything a completed move decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveReport {
    pub direction: Direction,
    pub from: TilePos,
    pub target: TilePos,
    /// Where the player ended up; differs from `target` after a defeat.
    pub position: TilePos,
    pub biome: Biome,
    pub chance: AmbushChance,
    pub danger_level: DangerLevel,
    pub roll: f64,
    pub ambushed: bool,
    pub outcome: AmbushOutcome,
    pub slice: Option<SliceTrigger>,
}

/// Result of the first phase of a move.
pub enum MoveStart<'p> {
    Arrived(MoveReport),
    Ambushed(PendingMove<'p>),
}

/// A move interrupted by an ambush. Holds the player state until resolved;
/// dropping it forfeits the fight.
pub struct PendingMove<'p> {
    ambush: PendingAmbush<'p>,
    direction: Direction,
    from: TilePos,
    target: TilePos,
    biome: Biome,
    slice: Option<SliceTrigger>,
}

impl PendingMove<'_> {
    #[must_use]
    pub fn enemies(&self) -> &[EnemySpec] {
        self.ambush.enemies()
    }

    #[must_use]
    pub const fn danger_level(&self) -> DangerLevel {
        self.ambush.danger_level()
    }

    /// Apply the combat result and finish the move.
    pub fn resolve(self, report: CombatReport) -> MoveReport {
        let Self {
            ambush,
            direction,
            from,
            target,
            biome,
            slice,
        } = self;
        let chance = *ambush.chance();
        let danger_level = ambush.danger_level();
        let roll = ambush.roll();
        let outcome = ambush.resolve(report);
        let position = match &outcome {
            AmbushOutcome::Defeat { respawn, .. } => *respawn,
            AmbushOutcome::Victory { .. } | AmbushOutcome::NoEnemy => target,
        };
        MoveReport {
            direction,
            from,
            target,
            position,
            biome,
            chance,
            danger_level,
            roll,
            ambushed: true,
            outcome,
            slice,
        }
    }

    /// Abandon the fight; resolves as a defeat.
    pub fn forfeit(self) -> MoveReport {
        self.resolve(CombatReport { victory: false })
    }
}

/// Drives moves for one shard with one tuning set.
#[derive(Debug, Clone)]
pub struct TravelController {
    world: WorldSnapshot,
    config: TravelConfig,
}

impl TravelController {
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration fails validation.
    pub fn new(world: WorldSnapshot, config: TravelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { world, config })
    }

    #[must_use]
    pub const fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    #[must_use]
    pub const fn config(&self) -> &TravelConfig {
        &self.config
    }

    /// Fresh player at the shard spawn with this shard's stamina budget.
    #[must_use]
    pub fn spawn_player(&self, player_id: impl Into<String>) -> PlayerTravelState {
        PlayerTravelState::new(player_id, self.world.spawn)
            .with_max_stamina(self.config.stamina.max)
    }

    /// Validate and start a move. A calm move completes immediately; an
    /// ambush returns a [`PendingMove`] awaiting the combat result.
    ///
    /// # Errors
    ///
    /// `BadDir` for unknown tokens, `OutOfBounds` for targets off the grid and
    /// `NoStamina` when the travel cost exceeds the remaining stamina.
    pub fn begin_move<'p>(
        &self,
        player: &'p mut PlayerTravelState,
        direction: &str,
        time_weather: TimeWeather,
    ) -> Result<MoveStart<'p>, TravelError> {
        let direction: Direction = direction.parse()?;
        let from = player.position;
        let (dx, dy) = direction.delta();
        let target = from.offset(dx, dy);
        if !self.world.contains(target) {
            return Err(TravelError::OutOfBounds {
                x: target.x,
                y: target.y,
            });
        }
        spend_stamina(player, self.config.stamina.cost_travel)?;

        let tile = self.world.tile(target).copied().unwrap_or_default();
        let slice = self.config.is_slice_tile(tile.tile_type).then_some(SliceTrigger {
            pos: target,
            biome: tile.biome,
            tile_type: tile.tile_type,
        });
        log::debug!(
            target: LOG_TARGET_TRAVEL,
            "{} moving {direction} {from} -> {target} ({})",
            player.player_id,
            tile.biome
        );

        let request = AmbushRequest {
            world: &self.world,
            config: &self.config,
            target,
            biome: tile.biome,
            time_weather,
        };
        let start = match begin_ambush(&request, player) {
            AmbushStart::NoTrigger {
                chance,
                danger_level,
                roll,
            }
            | AmbushStart::NoEnemy {
                chance,
                danger_level,
                roll,
            } => MoveStart::Arrived(MoveReport {
                direction,
                from,
                target,
                position: target,
                biome: tile.biome,
                chance,
                danger_level,
                roll,
                ambushed: false,
                outcome: AmbushOutcome::NoEnemy,
                slice,
            }),
            AmbushStart::Triggered(ambush) => MoveStart::Ambushed(PendingMove {
                ambush,
                direction,
                from,
                target,
                biome: tile.biome,
                slice,
            }),
        };
        Ok(start)
    }

    /// Run a whole move, blocking on `combat` when an ambush triggers and
    /// notifying `slices` when the target is a slice entrance.
    ///
    /// # Errors
    ///
    /// See [`TravelController::begin_move`].
    pub fn move_cardinal<C, S>(
        &self,
        player: &mut PlayerTravelState,
        direction: &str,
        time_weather: TimeWeather,
        combat: &mut C,
        slices: &mut S,
    ) -> Result<MoveReport, TravelError>
    where
        C: CombatResolver + ?Sized,
        S: SliceEntry + ?Sized,
    {
        let report = match self.begin_move(player, direction, time_weather)? {
            MoveStart::Arrived(report) => report,
            MoveStart::Ambushed(pending) => {
                let result = combat.engage(pending.enemies());
                pending.resolve(result)
            }
        };
        if let Some(trigger) = &report.slice {
            slices.enter_slice(trigger);
        }
        Ok(report)
    }

    /// Async variant of [`TravelController::move_cardinal`]. The player lock is
    /// held until the ambush resolves, so moves for one player never overlap.
    /// Cancelling the returned future mid-combat forfeits the fight.
    ///
    /// # Errors
    ///
    /// See [`TravelController::begin_move`].
    #[cfg(feature = "async")]
    pub async fn move_cardinal_async<C, S>(
        &self,
        player: &tokio::sync::Mutex<PlayerTravelState>,
        direction: &str,
        time_weather: TimeWeather,
        combat: &mut C,
        slices: &mut S,
    ) -> Result<MoveReport, TravelError>
    where
        C: crate::ambush::AsyncCombat,
        S: SliceEntry,
    {
        let mut guard = player.lock().await;
        let report = match self.begin_move(&mut guard, direction, time_weather)? {
            MoveStart::Arrived(report) => report,
            MoveStart::Ambushed(pending) => {
                let result = combat.engage(pending.enemies().to_vec()).await;
                pending.resolve(result)
            }
        };
        drop(guard);
        if let Some(trigger) = &report.slice {
            slices.enter_slice(trigger);
        }
        Ok(report)
    }

    /// Spend the per-room stamina cost for a step inside a slice.
    ///
    /// # Errors
    ///
    /// `NoStamina` when the cost exceeds the remaining stamina.
    pub fn spend_room_step(&self, player: &mut PlayerTravelState) -> Result<i32, TravelError> {
        spend_stamina(player, self.config.stamina.cost_room)
    }
}

fn spend_stamina(player: &mut PlayerTravelState, cost: i32) -> Result<i32, TravelError> {
    if player.stamina.saturating_sub(cost) < 0 {
        return Err(TravelError::NoStamina {
            stamina: player.stamina,
            cost,
        });
    }
    Ok(player.change_stamina(-cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileRecord;

    fn controller(p: f64) -> TravelController {
        let mut world = WorldSnapshot::filled(
            31,
            "travel",
            4,
            4,
            TilePos::new(0, 0),
            TileRecord::new(Biome::Plains, TileType::Terrain),
        );
        world.set_tile(TilePos::new(3, 3), TileRecord::new(Biome::Plains, TileType::Town));
        world.set_tile(TilePos::new(1, 0), TileRecord::new(Biome::Forest, TileType::Cave));
        let config = TravelConfig {
            p_floor: p,
            p_ceil: p,
            ..TravelConfig::default()
        };
        TravelController::new(world, config).unwrap()
    }

    fn never_slice(trigger: &SliceTrigger) {
        panic!("unexpected slice entry at {}", trigger.pos);
    }

    #[test]
    fn direction_tokens() {
        for direction in Direction::ALL {
            assert_eq!(direction.token().parse::<Direction>(), Ok(direction));
        }
        let err = "NE".parse::<Direction>().unwrap_err();
        assert_eq!(err.reason(), "BAD_DIR");
    }

    #[test]
    fn only_exact_tokens_parse() {
        for token in ["n", "west", " E", "S ", "North", ""] {
            assert_eq!(
                token.parse::<Direction>(),
                Err(TravelError::BadDir(token.to_string())),
                "{token:?}"
            );
        }
    }

    #[test]
    fn bad_direction_leaves_state() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState::default();
        let before = player.clone();
        let err = travel
            .move_cardinal(&mut player, "up", TimeWeather::default(), &mut |_: &[EnemySpec]| true, &mut never_slice)
            .unwrap_err();
        assert_eq!(err, TravelError::BadDir("up".to_string()));
        assert_eq!(player, before);
    }

    #[test]
    fn out_of_bounds_leaves_state() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState::default();
        let before = player.clone();
        let err = travel
            .move_cardinal(&mut player, "N", TimeWeather::default(), &mut |_: &[EnemySpec]| true, &mut never_slice)
            .unwrap_err();
        assert_eq!(err.reason(), "OUT_OF_BOUNDS");
        assert_eq!(player, before);
    }

    #[test]
    fn no_stamina_leaves_state() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState {
            stamina: 0,
            ..PlayerTravelState::default()
        };
        let before = player.clone();
        let err = travel
            .move_cardinal(&mut player, "S", TimeWeather::default(), &mut |_: &[EnemySpec]| true, &mut never_slice)
            .unwrap_err();
        assert_eq!(err, TravelError::NoStamina { stamina: 0, cost: 1 });
        assert_eq!(player, before);
    }

    #[test]
    fn calm_move_spends_stamina_and_moves() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState::default();
        let report = travel
            .move_cardinal(
                &mut player,
                "S",
                TimeWeather::default(),
                &mut |_: &[EnemySpec]| -> bool { panic!("no combat expected") },
                &mut never_slice,
            )
            .unwrap();
        assert!(!report.ambushed);
        assert_eq!(report.outcome, AmbushOutcome::NoEnemy);
        assert_eq!(player.position, TilePos::new(0, 1));
        assert_eq!(player.stamina, 99);
        assert_eq!(player.ambush_history.last(), Some(&false));
        assert_eq!(player.ambush_history.len(), 5);
    }

    #[test]
    fn slice_tiles_signal_entry() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState::default();
        let mut entered = Vec::new();
        let report = travel
            .move_cardinal(
                &mut player,
                "E",
                TimeWeather::default(),
                &mut |_: &[EnemySpec]| true,
                &mut |trigger: &SliceTrigger| entered.push(*trigger),
            )
            .unwrap();
        assert_eq!(report.slice.map(|t| t.tile_type), Some(TileType::Cave));
        assert_eq!(entered.len(), 1);
        assert_eq!(entered[0].biome, Biome::Forest);
    }

    #[test]
    fn defeat_moves_to_town_not_target() {
        let travel = controller(1.0);
        let mut player = PlayerTravelState::new("p", TilePos::new(0, 2));
        player.add_item("scrap_bone", 1);
        let report = travel
            .move_cardinal(
                &mut player,
                "S",
                TimeWeather::default(),
                &mut |_: &[EnemySpec]| false,
                &mut never_slice,
            )
            .unwrap();
        assert!(report.ambushed);
        assert!(report.outcome.is_defeat());
        assert_eq!(report.position, TilePos::new(3, 3));
        assert_eq!(player.position, TilePos::new(3, 3));
        assert_eq!(player.stamina, player.max_stamina);
        assert_eq!(player.item_count("scrap_bone"), 0);
        assert_eq!(player.ambush_history.last(), Some(&true));
    }

    #[test]
    fn victory_moves_to_target_with_loot() {
        let travel = controller(1.0);
        let mut player = PlayerTravelState::new("p", TilePos::new(0, 2));
        let mut fought = 0;
        let report = travel
            .move_cardinal(
                &mut player,
                "E",
                TimeWeather::default(),
                &mut |enemies: &[EnemySpec]| {
                    fought += enemies.len();
                    true
                },
                &mut never_slice,
            )
            .unwrap();
        assert_eq!(player.position, TilePos::new(1, 2));
        assert_eq!(report.position, TilePos::new(1, 2));
        assert!(fought > 0);
        assert_eq!(player.total_items(), u32::try_from(fought).unwrap());
    }

    #[test]
    fn two_phase_move_and_forfeit() {
        let travel = controller(1.0);
        let mut player = PlayerTravelState::new("p", TilePos::new(1, 1));
        let MoveStart::Ambushed(pending) = travel
            .begin_move(&mut player, "S", TimeWeather { night: true, storm: false })
            .unwrap()
        else {
            panic!("ambush expected");
        };
        assert!(!pending.enemies().is_empty());
        let report = pending.forfeit();
        assert!(report.outcome.is_defeat());
        assert_eq!(player.position, TilePos::new(3, 3));
    }

    #[test]
    fn room_steps_use_room_cost() {
        let travel = controller(0.0);
        let mut player = PlayerTravelState {
            stamina: 1,
            ..PlayerTravelState::default()
        };
        assert_eq!(travel.spend_room_step(&mut player), Ok(0));
        assert_eq!(
            travel.spend_room_step(&mut player),
            Err(TravelError::NoStamina { stamina: 0, cost: 1 })
        );
    }

    #[test]
    fn spawned_players_use_configured_stamina() {
        let mut world_config = TravelConfig::default();
        world_config.stamina.max = 5;
        let world = WorldSnapshot::filled(1, "s", 3, 3, TilePos::new(1, 1), TileRecord::default());
        let travel = TravelController::new(world, world_config).unwrap();
        let player = travel.spawn_player("fresh");
        assert_eq!(player.position, TilePos::new(1, 1));
        assert_eq!((player.stamina, player.max_stamina), (5, 5));
    }

    #[test]
    fn negative_room_cost_is_rejected() {
        let mut config = TravelConfig::default();
        config.stamina.cost_room = -10;
        let world = WorldSnapshot::filled(1, "s", 2, 2, TilePos::default(), TileRecord::default());
        assert!(matches!(
            TravelController::new(world, config),
            Err(ConfigError::MinViolation {
                field: "stamina.cost_room",
                ..
            })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TravelConfig {
            p_floor: 0.9,
            p_ceil: 0.1,
            ..TravelConfig::default()
        };
        let world = WorldSnapshot::filled(1, "s", 2, 2, TilePos::default(), TileRecord::default());
        assert!(TravelController::new(world, config).is_err());
    }
}
