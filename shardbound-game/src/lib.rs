//! Shardbound Encounter Core
//!
//! Deterministic ambush, danger and loot simulation for the Shardbound client.
//! Every decision is derived from the world seed, shard id, tile coordinates
//! and player id, so two clients replaying the same moves agree exactly.
//! The crate has no UI, storage or network dependencies.

pub mod ambush;
pub mod config;
pub mod constants;
pub mod encounters;
pub mod hash_seed;
pub mod loot;
pub mod numbers;
pub mod player;
pub mod probability;
pub mod rng;
pub mod travel;
pub mod world;

use thiserror::Error;

// Re-export commonly used types
#[cfg(feature = "async")]
pub use ambush::AsyncCombat;
pub use ambush::{
    AmbushOutcome, AmbushPhase, AmbushRequest, AmbushStart, CombatReport, CombatResolver,
    PendingAmbush, begin_ambush,
};
pub use config::{
    ConfigError, GroupSize, SafetyConfig, StaminaConfig, StreakConfig, TravelConfig,
};
pub use encounters::{
    EnemyGroup, EnemySpec, GroupRequest, build_enemy_group, hazard_pool, mob_pool, resource_pool,
    roll_hazard, roll_resource,
};
pub use hash_seed::{RoomScope, SeedPart, ambush_seed, derive, fnv1a, hash2, hash_combine};
pub use loot::{
    ItemId, LootContext, LootRoll, NON_RARE_ITEMS, SliceLootRequest, Tier, is_non_rare,
    item_pool, roll_loot, roll_slice_loot, tier_weights, weighted_pick,
};
pub use player::PlayerTravelState;
pub use probability::{
    AmbushChance, ChanceBreakdown, DangerLevel, NearestSettlement, ProbabilityInput, TimeWeather,
    compute_ambush_chance, compute_danger_level, nearest_town_port,
};
pub use rng::{RngAlgo, RngStream};
pub use travel::{
    Direction, MoveReport, MoveStart, PendingMove, SliceEntry, SliceTrigger, TravelController,
    TravelError,
};
pub use world::{Biome, TilePos, TileRecord, TileType, WorldSnapshot};

/// Trait for abstracting world loading
/// Platform-specific implementations should provide this
pub trait WorldProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the snapshot for a shard
    ///
    /// # Errors
    ///
    /// Returns an error if the shard cannot be loaded.
    fn load_world(&self, shard_id: &str) -> Result<WorldSnapshot, Self::Error>;

    /// Load the travel tuning for a shard; defaults when not overridden
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self, _shard_id: &str) -> Result<TravelConfig, Self::Error> {
        Ok(TravelConfig::default())
    }
}

/// Trait for abstracting player persistence
/// Platform-specific implementations should provide this
pub trait PlayerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a player's travel state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded.
    fn load_player(&self, player_id: &str) -> Result<Option<PlayerTravelState>, Self::Error>;

    /// Save a player's travel state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save_player(&self, player: &PlayerTravelState) -> Result<(), Self::Error>;
}

/// Failures surfaced by [`EncounterEngine`].
#[derive(Debug, Error)]
pub enum EngineError<W, S> {
    #[error("world provider failed: {0}")]
    World(W),
    #[error("player store failed: {0}")]
    Store(S),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Travel(#[from] TravelError),
}

/// Main engine tying a world provider and player store to the travel core
pub struct EncounterEngine<W, S>
where
    W: WorldProvider,
    S: PlayerStore,
{
    worlds: W,
    store: S,
}

impl<W, S> EncounterEngine<W, S>
where
    W: WorldProvider,
    S: PlayerStore,
{
    /// Create a new engine with the provided world provider and store
    pub const fn new(worlds: W, store: S) -> Self {
        Self { worlds, store }
    }

    /// Build a travel controller for a shard
    ///
    /// # Errors
    ///
    /// Returns an error if the shard or its configuration cannot be loaded or
    /// the configuration is invalid.
    pub fn controller(
        &self,
        shard_id: &str,
    ) -> Result<TravelController, EngineError<W::Error, S::Error>> {
        let world = self.worlds.load_world(shard_id).map_err(EngineError::World)?;
        let config = self.worlds.load_config(shard_id).map_err(EngineError::World)?;
        Ok(TravelController::new(world, config)?)
    }

    /// Load a player, or create a fresh one at the shard spawn with the
    /// shard's stamina budget
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn load_or_spawn(
        &self,
        controller: &TravelController,
        player_id: &str,
    ) -> Result<PlayerTravelState, EngineError<W::Error, S::Error>> {
        let loaded = self.store.load_player(player_id).map_err(EngineError::Store)?;
        Ok(loaded.unwrap_or_else(|| controller.spawn_player(player_id)))
    }

    /// Run one move for a stored player and persist the result
    ///
    /// # Errors
    ///
    /// Returns an error if loading, the move itself, or saving fails. A
    /// rejected move saves nothing.
    pub fn travel<C, E>(
        &self,
        controller: &TravelController,
        player_id: &str,
        direction: &str,
        time_weather: TimeWeather,
        combat: &mut C,
        slices: &mut E,
    ) -> Result<MoveReport, EngineError<W::Error, S::Error>>
    where
        C: CombatResolver + ?Sized,
        E: SliceEntry + ?Sized,
    {
        let mut player = self.load_or_spawn(controller, player_id)?;
        let report = controller.move_cardinal(&mut player, direction, time_weather, combat, slices)?;
        self.store.save_player(&player).map_err(EngineError::Store)?;
        Ok(report)
    }
}
