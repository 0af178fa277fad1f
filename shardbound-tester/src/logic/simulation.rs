use serde::Serialize;
use std::collections::BTreeMap;

use shardbound_game::{
    AmbushOutcome, Biome, CombatReport, CombatResolver, DangerLevel, Direction, EnemySpec,
    PlayerTravelState, RngAlgo, RngStream, RoomScope, SliceLootRequest, SliceTrigger, Tier,
    TileRecord, TilePos, TileType, TimeWeather, TravelConfig, TravelController, TravelError,
    WorldSnapshot, derive, roll_slice_loot,
};

/// Rooms visited per slice entry.
const ROOMS_PER_SLICE: i32 = 3;
const STORM_CHANCE: f64 = 0.1;
const NIGHT_LENGTH: usize = 3;
const DAY_LENGTH: usize = 8;

const TILE_TYPE_WEIGHTS: [(TileType, f64); 7] = [
    (TileType::Terrain, 84.0),
    (TileType::Town, 2.0),
    (TileType::Port, 1.0),
    (TileType::Ruins, 3.0),
    (TileType::Dungeon, 3.0),
    (TileType::DenseForest, 4.0),
    (TileType::Cave, 3.0),
];

/// Configuration for one simulated player walk.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u32,
    pub steps: usize,
    pub width: i32,
    pub height: i32,
    pub win_rate: f64,
    pub algo: RngAlgo,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            seed,
            steps: 200,
            width: 24,
            height: 24,
            win_rate: 0.7,
            algo: RngAlgo::Mulberry32,
        }
    }

    #[must_use]
    pub const fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }
}

/// Counters collected over one walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub seed: u32,
    pub shard_id: String,
    pub moves: u32,
    pub ambushes: u32,
    pub victories: u32,
    pub defeats: u32,
    pub enemies_faced: u32,
    pub loot_by_tier: BTreeMap<Tier, u32>,
    pub items_lost: u32,
    pub slice_entries: u32,
    pub slice_rooms: u32,
    pub rests: u32,
    pub rejected: BTreeMap<String, u32>,
    pub max_danger_level: u8,
    pub mean_chance: f64,
    pub final_position: TilePos,
    pub final_items: u32,
    /// Contract breaches noticed while walking; empty on a healthy run.
    pub violations: Vec<String>,
}

impl RunStats {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Combat stand-in that wins with a fixed probability.
pub struct ScriptedCombat {
    stream: RngStream,
    win_rate: f64,
    pub fights: u32,
}

impl ScriptedCombat {
    #[must_use]
    pub fn new(seed: u32, win_rate: f64, algo: RngAlgo) -> Self {
        Self {
            stream: RngStream::from_seed(derive(seed, "combat"), algo),
            win_rate,
            fights: 0,
        }
    }
}

impl CombatResolver for ScriptedCombat {
    fn engage(&mut self, enemies: &[EnemySpec]) -> CombatReport {
        self.fights += 1;
        log::trace!("fight {} against {} enemies", self.fights, enemies.len());
        CombatReport {
            victory: self.stream.bool(self.win_rate),
        }
    }
}

/// Build a shard with random biomes, a handful of settlements and slice
/// entrances. The spawn tile is always a town.
#[must_use]
pub fn generate_world(seed: u32, width: i32, height: i32, algo: RngAlgo) -> WorldSnapshot {
    let mut stream = RngStream::from_seed(derive(seed, "world"), algo);
    let spawn = TilePos::new(width / 2, height / 2);
    let mut world = WorldSnapshot::filled(
        seed,
        format!("sim-{seed:08x}"),
        width,
        height,
        spawn,
        TileRecord::default(),
    );
    for y in 0..height {
        for x in 0..width {
            let biome = stream.pick(&Biome::ALL).copied().unwrap_or_default();
            let tile_type = stream
                .pick_weighted(&TILE_TYPE_WEIGHTS)
                .copied()
                .unwrap_or_default();
            world.set_tile(TilePos::new(x, y), TileRecord::new(biome, tile_type));
        }
    }
    world.set_tile(spawn, TileRecord::new(Biome::Plains, TileType::Town));
    world
}

/// Walk one player across `world` and collect statistics.
///
/// # Errors
///
/// Returns an error if the travel configuration is invalid.
pub fn run_simulation(
    sim: &SimulationConfig,
    world: WorldSnapshot,
    config: TravelConfig,
) -> anyhow::Result<RunStats> {
    let config = TravelConfig {
        rng_algo: sim.algo,
        ..config
    };
    let rest_amount = config.stamina.field_rest_recovery;
    let window = config.ambush_history_window;
    let controller = TravelController::new(world, config)?;

    let mut walker = RngStream::from_seed(derive(sim.seed, "walk"), sim.algo);
    let mut combat = ScriptedCombat::new(sim.seed, sim.win_rate, sim.algo);
    let mut player = controller.spawn_player(format!("walker-{}", sim.seed));

    let mut stats = RunStats {
        seed: sim.seed,
        shard_id: controller.world().shard_id.clone(),
        ..RunStats::default()
    };
    let mut chance_total = 0.0;

    for step in 0..sim.steps {
        let direction = walker.pick(&Direction::ALL).copied().unwrap_or(Direction::North);
        let time_weather = TimeWeather {
            night: step % (DAY_LENGTH + NIGHT_LENGTH) >= DAY_LENGTH,
            storm: walker.bool(STORM_CHANCE),
        };
        let items_before = player.total_items();
        let mut entered: Vec<SliceTrigger> = Vec::new();
        let result = controller.move_cardinal(
            &mut player,
            direction.token(),
            time_weather,
            &mut combat,
            &mut |trigger: &SliceTrigger| entered.push(*trigger),
        );
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                *stats.rejected.entry(err.reason().to_string()).or_default() += 1;
                if matches!(err, TravelError::NoStamina { .. })
                    && !player.use_field_ration(rest_amount)
                {
                    player.full_rest();
                    stats.rests += 1;
                }
                continue;
            }
        };

        stats.moves += 1;
        chance_total += report.chance.p;
        stats.max_danger_level = stats.max_danger_level.max(report.danger_level.get());
        if player.position != report.position {
            stats.violations.push(format!(
                "step {step}: player at {} but report says {}",
                player.position, report.position
            ));
        }
        if player.ambush_history.len() != window {
            stats.violations.push(format!(
                "step {step}: history holds {} entries",
                player.ambush_history.len()
            ));
        }

        match &report.outcome {
            AmbushOutcome::Victory { enemies, loot } => {
                stats.ambushes += 1;
                stats.victories += 1;
                stats.enemies_faced += count(enemies.len());
                for roll in loot {
                    *stats.loot_by_tier.entry(roll.tier).or_default() += 1;
                }
                if player.total_items() != items_before + count(loot.len()) {
                    stats
                        .violations
                        .push(format!("step {step}: victory loot not added"));
                }
            }
            AmbushOutcome::Defeat {
                enemies, lost_item, ..
            } => {
                stats.ambushes += 1;
                stats.defeats += 1;
                stats.enemies_faced += count(enemies.len());
                if lost_item.is_some() {
                    stats.items_lost += 1;
                }
                if player.stamina != player.max_stamina || player.hp != player.max_hp {
                    stats
                        .violations
                        .push(format!("step {step}: defeat did not restore the player"));
                }
            }
            AmbushOutcome::NoEnemy => {}
        }

        for trigger in &entered {
            stats.slice_entries += 1;
            explore_slice(&controller, &mut player, trigger, &mut stats);
        }
    }

    if stats.moves > 0 {
        chance_total /= f64::from(stats.moves);
    }
    stats.mean_chance = chance_total;
    stats.final_position = player.position;
    stats.final_items = player.total_items();
    log::debug!(
        "seed {} finished: {} moves, {} ambushes, {} slices",
        sim.seed,
        stats.moves,
        stats.ambushes,
        stats.slice_entries
    );
    Ok(stats)
}

/// Step through a short corridor of rooms, looting each one.
fn explore_slice(
    controller: &TravelController,
    player: &mut PlayerTravelState,
    trigger: &SliceTrigger,
    stats: &mut RunStats,
) {
    let world = controller.world();
    for room in 0..ROOMS_PER_SLICE {
        if controller.spend_room_step(player).is_err() {
            break;
        }
        let request = SliceLootRequest {
            scope: RoomScope {
                world_seed: world.world_seed,
                shard_id: &world.shard_id,
                tile_x: trigger.pos.x,
                tile_y: trigger.pos.y,
                room_x: room,
                room_y: 0,
                player_id: &player.player_id,
            },
            biome: trigger.biome,
            danger_level: DangerLevel::saturating(u8::try_from(room).unwrap_or(0)),
            for_node: room == ROOMS_PER_SLICE - 1,
        };
        let roll = roll_slice_loot(&request, controller.config().rng_algo);
        player.add_item(&roll.item_id, 1);
        *stats.loot_by_tier.entry(roll.tier).or_default() += 1;
        stats.slice_rooms += 1;
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_world_is_reproducible() {
        let a = generate_world(7, 10, 6, RngAlgo::Mulberry32);
        let b = generate_world(7, 10, 6, RngAlgo::Mulberry32);
        assert_eq!(a, b);
        assert_eq!(a.tile(a.spawn).map(|t| t.tile_type), Some(TileType::Town));
        assert_ne!(a, generate_world(8, 10, 6, RngAlgo::Mulberry32));
    }

    #[test]
    fn simulation_is_deterministic() {
        let sim = SimulationConfig::new(42).with_steps(120);
        let world = generate_world(sim.seed, sim.width, sim.height, sim.algo);
        let first = run_simulation(&sim, world.clone(), TravelConfig::default()).unwrap();
        let second = run_simulation(&sim, world, TravelConfig::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.passed(), "{:?}", first.violations);
    }

    #[test]
    fn ambush_counts_add_up() {
        let sim = SimulationConfig::new(9).with_steps(300);
        let world = generate_world(sim.seed, sim.width, sim.height, sim.algo);
        let config = TravelConfig {
            p_floor: 0.6,
            p_ceil: 0.6,
            ..TravelConfig::default()
        };
        let stats = run_simulation(&sim, world, config).unwrap();
        assert!(stats.ambushes > 0);
        assert_eq!(stats.ambushes, stats.victories + stats.defeats);
        assert!(stats.enemies_faced >= stats.ambushes);
        assert!(stats.passed(), "{:?}", stats.violations);
    }

    #[test]
    fn exhaustion_triggers_rests() {
        let sim = SimulationConfig::new(3).with_steps(60);
        let world = generate_world(sim.seed, sim.width, sim.height, sim.algo);
        let mut config = TravelConfig::default();
        config.stamina.max = 5;
        config.stamina.field_rest_recovery = 2;
        let stats = run_simulation(&sim, world, config).unwrap();
        assert!(stats.rejected.get("NO_STAMINA").copied().unwrap_or(0) > 0);
        assert!(stats.rests > 0);
    }

    #[test]
    fn walkers_start_with_configured_stamina() {
        let sim = SimulationConfig {
            win_rate: 1.0,
            ..SimulationConfig::new(11).with_steps(3)
        };
        let world = generate_world(sim.seed, sim.width, sim.height, sim.algo);
        let mut config = TravelConfig::default();
        config.stamina.max = 2;
        let stats = run_simulation(&sim, world, config).unwrap();
        assert_eq!(stats.moves + stats.rejected.values().sum::<u32>(), 3);
        assert!(stats.rejected.get("NO_STAMINA").copied().unwrap_or(0) >= 1);
    }

    #[test]
    fn invalid_config_fails() {
        let sim = SimulationConfig::new(1);
        let world = generate_world(sim.seed, 4, 4, sim.algo);
        let config = TravelConfig {
            p_floor: 0.8,
            p_ceil: 0.2,
            ..TravelConfig::default()
        };
        assert!(run_simulation(&sim, world, config).is_err());
    }
}
