//! Encounter tables: enemy archetypes by biome and danger level, plus the
//! resource-node and hazard pools used by slice content.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::TravelConfig;
use crate::constants::LOG_TARGET_AMBUSH;
use crate::probability::DangerLevel;
use crate::rng::RngStream;
use crate::world::Biome;

/// One enemy handed to the combat collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySpec {
    pub archetype: String,
    pub danger_level: DangerLevel,
    pub biome: Biome,
}

/// Enemies drawn for one ambush; never more than three by default tuning.
pub type EnemyGroup = SmallVec<[EnemySpec; 3]>;

type DangerPools = [&'static [&'static str]; 6];

const PLAINS_ENEMIES: DangerPools = [
    &["field_rat"],
    &["wild_dog"],
    &["bandit_scout", "wild_dog"],
    &["bandit_raider", "wolf"],
    &["bandit_raider", "wolf_elder"],
    &["war_wolf", "bandit_veteran"],
];

const FOREST_ENEMIES: DangerPools = [
    &["forest_imp"],
    &["wolf"],
    &["wolf", "bandit_scout"],
    &["ash_imp", "wolf_elder"],
    &["ash_imp", "bandit_raider"],
    &["ash_demon", "war_wolf"],
];

const DESERT_ENEMIES: DangerPools = [
    &["sand_rat"],
    &["scavenger"],
    &["scorpion", "scavenger"],
    &["sand_bandit", "scorpion"],
    &["sand_bandit", "scarab_guard"],
    &["dune_reaver", "scarab_guard"],
];

const MOUNTAINS_ENEMIES: DangerPools = [
    &["rock_sprite"],
    &["cave_grub"],
    &["cave_grub", "rock_sprite"],
    &["cairn_guard"],
    &["cairn_guard", "stone_warg"],
    &["stone_warg", "rune_golem"],
];

const VOLCANIC_RIM_ENEMIES: DangerPools = [
    &["ember_mite"],
    &["ash_imp"],
    &["ash_imp", "emberling"],
    &["emberling", "magma_whelp"],
    &["magma_whelp", "ash_stalker"],
    &["ash_stalker", "lava_horror"],
];

const TUNDRA_ENEMIES: DangerPools = [
    &["ice_mite"],
    &["snow_fox"],
    &["snow_fox", "raider"],
    &["ice_warg", "raider"],
    &["ice_warg", "frost_troll"],
    &["frost_troll", "blizzard_spirit"],
];

const WETLANDS_ENEMIES: DangerPools = [
    &["bog_mite"],
    &["bog_slug"],
    &["bog_slug", "bandit_scout"],
    &["bog_fiend"],
    &["bog_fiend", "mire_witch"],
    &["mire_witch", "ancient_mireling"],
];

const COAST_ENEMIES: DangerPools = [
    &["shore_crab"],
    &["reef_eel"],
    &["reef_eel", "bandit_scout"],
    &["reef_raider"],
    &["reef_raider", "tidal_whelp"],
    &["tidal_whelp", "storm_siren"],
];

const TROPICAL_ENEMIES: DangerPools = [
    &["jungle_rat"],
    &["jungle_spider"],
    &["jungle_spider", "bandit_scout"],
    &["raptorling"],
    &["raptorling", "vine_witch"],
    &["vine_witch", "ancient_raptor"],
];

/// Mob archetypes for `biome` at `danger_level`; unknown biomes use plains.
#[must_use]
pub const fn mob_pool(biome: Biome, danger_level: DangerLevel) -> &'static [&'static str] {
    let table = match biome {
        Biome::Forest => &FOREST_ENEMIES,
        Biome::Desert => &DESERT_ENEMIES,
        Biome::Mountains => &MOUNTAINS_ENEMIES,
        Biome::VolcanicRim => &VOLCANIC_RIM_ENEMIES,
        Biome::Tundra => &TUNDRA_ENEMIES,
        Biome::Wetlands => &WETLANDS_ENEMIES,
        Biome::Coast => &COAST_ENEMIES,
        Biome::Tropical => &TROPICAL_ENEMIES,
        Biome::Plains | Biome::Beach | Biome::Bog | Biome::Unknown => &PLAINS_ENEMIES,
    };
    table[danger_level.index()]
}

#[must_use]
pub const fn resource_pool(biome: Biome) -> &'static [&'static str] {
    match biome {
        Biome::Forest => &["herb_moss", "ore_tin", "fiber_flax", "resin_pure"],
        Biome::Desert => &["herb_spice", "ore_iron", "glass_shard_fine", "fiber_jute"],
        Biome::Mountains => &["ore_iron", "ore_coal", "ore_tin", "pelt_thick"],
        Biome::VolcanicRim => &["obsidian_chip", "ore_nickel", "herb_ash_bloom"],
        Biome::Tundra => &["herb_ice", "pelt_frozen", "ore_tin", "fiber_felt"],
        Biome::Wetlands => &["herb_reed", "resin_swamp", "ore_copper"],
        Biome::Coast => &["herb_kelp", "pearl_small", "ore_copper"],
        Biome::Tropical => &["herb_basil", "resin_sweet", "fiber_jute"],
        Biome::Plains | Biome::Beach | Biome::Bog | Biome::Unknown => {
            &["herb_common", "ore_copper", "fiber_hemp"]
        }
    }
}

#[must_use]
pub const fn hazard_pool(biome: Biome) -> &'static [&'static str] {
    match biome {
        Biome::Forest => &["thorn_thicket", "snare_trap", "falling_branch"],
        Biome::Desert => &["sandstorm_gust", "loose_dune", "cactus_patch"],
        Biome::Mountains => &["rockslide_small", "icy_patch", "narrow_ledge"],
        Biome::VolcanicRim => &["ash_vent", "lava_crust_thin", "toxic_fume"],
        Biome::Tundra => &["whiteout_flurry", "thin_ice", "frostbite_zone"],
        Biome::Wetlands => &["bog_suction", "toxic_mire", "leeches"],
        Biome::Coast => &["rogue_wave", "slippery_rock", "tide_pool_sting"],
        Biome::Tropical => &["vines_tangle", "acidic_spores", "quicksand"],
        Biome::Plains | Biome::Beach | Biome::Bog | Biome::Unknown => {
            &["snare_trap", "sinkhole_small"]
        }
    }
}

/// Parameters for building one ambush group.
pub struct GroupRequest<'a> {
    pub config: &'a TravelConfig,
    pub danger_level: DangerLevel,
    pub biome: Biome,
}

/// Draw the group size for the danger level, then one archetype per slot.
pub fn build_enemy_group(request: &GroupRequest<'_>, stream: &mut RngStream) -> EnemyGroup {
    let size = request.config.group_size(request.danger_level.get());
    let count = stream.int(i64::from(size.min()), i64::from(size.max()) + 1);
    let pool = mob_pool(request.biome, request.danger_level);
    let mut group = EnemyGroup::new();
    for _ in 0..count {
        let Some(archetype) = stream.pick(pool) else {
            break;
        };
        group.push(EnemySpec {
            archetype: (*archetype).to_string(),
            danger_level: request.danger_level,
            biome: request.biome,
        });
    }
    log::debug!(
        target: LOG_TARGET_AMBUSH,
        "built {} enemies for {} at danger {}",
        group.len(),
        request.biome,
        request.danger_level.get()
    );
    group
}

/// Uniform pick from the biome's resource-node pool.
pub fn roll_resource(biome: Biome, stream: &mut RngStream) -> Option<&'static str> {
    stream.pick(resource_pool(biome)).copied()
}

/// Uniform pick from the biome's hazard pool.
pub fn roll_hazard(biome: Biome, stream: &mut RngStream) -> Option<&'static str> {
    stream.pick(hazard_pool(biome)).copied()
}
