//! Tiered loot tables for ambush and slice rewards.
//!
//! A roll first picks a rarity tier from the weight table for the danger
//! level, then picks uniformly from the biome's item pool for that tier.
//! Unrecognised biomes use the plains pools.

use serde::{Deserialize, Serialize};

use crate::constants::LOG_TARGET_LOOT;
use crate::hash_seed::{RoomScope, slice_loot_seed};
use crate::probability::DangerLevel;
use crate::rng::{RngAlgo, RngStream};
use crate::world::Biome;

/// Item identifier as stored in inventories.
pub type ItemId = String;

/// Loot rarity bucket, `T0` lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    T0,
    T1,
    T2,
    T3,
    T4,
}

impl Tier {
    /// Declared iteration order for weighted picks.
    pub const ORDER: [Self; 5] = [Self::T0, Self::T1, Self::T2, Self::T3, Self::T4];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Which weight table a roll uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootContext {
    Ambush,
    Slice,
}

/// One resolved loot event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootRoll {
    pub tier: Tier,
    pub item_id: ItemId,
}

const AMBUSH_TIER_WEIGHTS: [[u16; 5]; 6] = [
    [55, 40, 5, 0, 0],
    [45, 45, 9, 1, 0],
    [35, 50, 13, 2, 0],
    [25, 55, 17, 3, 0],
    [20, 55, 20, 5, 0],
    [15, 55, 22, 7, 1],
];

const SLICE_TIER_WEIGHTS: [[u16; 5]; 6] = [
    [40, 45, 13, 2, 0],
    [30, 50, 17, 3, 0],
    [20, 55, 20, 5, 0],
    [15, 55, 23, 6, 1],
    [10, 55, 25, 9, 1],
    [8, 52, 27, 11, 2],
];

/// Tier weights for `danger_level` in declared tier order.
#[must_use]
pub fn tier_weights(danger_level: DangerLevel, context: LootContext) -> [(Tier, f64); 5] {
    let table = match context {
        LootContext::Ambush => &AMBUSH_TIER_WEIGHTS,
        LootContext::Slice => &SLICE_TIER_WEIGHTS,
    };
    let row = table[danger_level.index()];
    Tier::ORDER.map(|tier| (tier, f64::from(row[tier.index()])))
}

/// Pick a tier by sequential subtraction; empty tables yield `T0`.
pub fn weighted_pick(weights: &[(Tier, f64)], stream: &mut RngStream) -> Tier {
    stream.pick_weighted(weights).copied().unwrap_or(Tier::T0)
}

type TierPools = [&'static [&'static str]; 5];

const PLAINS_ITEMS: TierPools = [
    &["scrap_bone", "torn_pelt", "broken_fang"],
    &["herb_common", "ore_copper", "fiber_hemp"],
    &["ingot_bronze", "pelt_cured", "mana_shard_small"],
    &["rare_mat_plains", "blueprint_frag_1"],
    &["epic_core_fragment"],
];

const FOREST_ITEMS: TierPools = [
    &["twig_bundle", "bug_chitin", "torn_pelt"],
    &["herb_moss", "ore_tin", "fiber_flax"],
    &["ingot_bronze", "resin_pure", "mana_shard_small"],
    &["rare_mooncap", "blueprint_frag_1"],
    &["ancient_heartwood"],
];

const DESERT_ITEMS: TierPools = [
    &["sand_shard", "dried_scale", "cracked_claw"],
    &["herb_spice", "ore_iron", "fiber_jute"],
    &["ingot_iron", "glass_shard_fine", "mana_shard_small"],
    &["rare_meteor_fragment", "blueprint_frag_2"],
    &["sun_crystal"],
];

const MOUNTAINS_ITEMS: TierPools = [
    &["shale_chunk", "dented_plate", "dusty_pelt"],
    &["ore_iron", "ore_coal", "fiber_wool"],
    &["ingot_steel", "mana_shard_small", "pelt_thick"],
    &["rare_runic_dust", "blueprint_frag_2"],
    &["ancient_core_runic"],
];

const VOLCANIC_RIM_ITEMS: TierPools = [
    &["ash_flake", "scorched_fiber", "charred_bone"],
    &["obsidian_chip", "ore_nickel", "herb_ash_bloom"],
    &["ingot_nickel", "mana_shard_small", "obsidian_piece"],
    &["rare_obsidian_core", "blueprint_frag_3"],
    &["magma_heart"],
];

const TUNDRA_ITEMS: TierPools = [
    &["frost_scrap", "brittle_bone", "frayed_fur"],
    &["herb_ice", "ore_tin", "fiber_felt"],
    &["ingot_bronze", "mana_shard_small", "pelt_frozen"],
    &["rare_frost_crystal", "blueprint_frag_2"],
    &["heart_of_winter"],
];

const WETLANDS_ITEMS: TierPools = [
    &["mire_mud", "reedy_twine", "bog_chitin"],
    &["herb_reed", "ore_copper", "fiber_flax"],
    &["ingot_bronze", "mana_shard_small", "resin_swamp"],
    &["rare_mire_amber", "blueprint_frag_1"],
    &["ancient_bog_core"],
];

const COAST_ITEMS: TierPools = [
    &["shell_chipped", "tangle_kelp", "salt_spray"],
    &["herb_kelp", "ore_copper", "fiber_hemp"],
    &["ingot_bronze", "mana_shard_small", "pearl_small"],
    &["rare_black_pearl", "blueprint_frag_1"],
    &["storm_pearl"],
];

const TROPICAL_ITEMS: TierPools = [
    &["dried_leaf", "bug_carapace", "torn_pelt"],
    &["herb_basil", "ore_copper", "fiber_jute"],
    &["ingot_bronze", "mana_shard_small", "resin_sweet"],
    &["rare_sun_bloom", "blueprint_frag_3"],
    &["ancient_sun_core"],
];

const fn pools_for(biome: Biome) -> &'static TierPools {
    match biome {
        Biome::Forest => &FOREST_ITEMS,
        Biome::Desert => &DESERT_ITEMS,
        Biome::Mountains => &MOUNTAINS_ITEMS,
        Biome::VolcanicRim => &VOLCANIC_RIM_ITEMS,
        Biome::Tundra => &TUNDRA_ITEMS,
        Biome::Wetlands => &WETLANDS_ITEMS,
        Biome::Coast => &COAST_ITEMS,
        Biome::Tropical => &TROPICAL_ITEMS,
        Biome::Plains | Biome::Beach | Biome::Bog | Biome::Unknown => &PLAINS_ITEMS,
    }
}

/// Items a `tier` roll can produce in `biome`.
#[must_use]
pub const fn item_pool(biome: Biome, tier: Tier) -> &'static [&'static str] {
    pools_for(biome)[tier.index()]
}

/// Low-tier items eligible to be lost on defeat.
pub const NON_RARE_ITEMS: [&str; 43] = [
    "scrap_bone",
    "torn_pelt",
    "broken_fang",
    "twig_bundle",
    "bug_chitin",
    "sand_shard",
    "dried_scale",
    "cracked_claw",
    "shale_chunk",
    "dented_plate",
    "dusty_pelt",
    "ash_flake",
    "scorched_fiber",
    "charred_bone",
    "frost_scrap",
    "brittle_bone",
    "frayed_fur",
    "mire_mud",
    "reedy_twine",
    "bog_chitin",
    "shell_chipped",
    "tangle_kelp",
    "salt_spray",
    "dried_leaf",
    "bug_carapace",
    "herb_common",
    "ore_copper",
    "fiber_hemp",
    "herb_moss",
    "ore_tin",
    "fiber_flax",
    "herb_spice",
    "fiber_jute",
    "ore_iron",
    "ore_coal",
    "fiber_wool",
    "obsidian_chip",
    "ore_nickel",
    "herb_ash_bloom",
    "herb_ice",
    "herb_reed",
    "herb_kelp",
    "herb_basil",
];

#[must_use]
pub fn is_non_rare(item_id: &str) -> bool {
    NON_RARE_ITEMS.contains(&item_id)
}

fn pick_item(biome: Biome, tier: Tier, stream: &mut RngStream) -> &'static str {
    stream
        .pick(item_pool(biome, tier))
        .copied()
        .unwrap_or(PLAINS_ITEMS[0][0])
}

/// Roll one item: weighted tier, then a uniform pick from the biome pool.
pub fn roll_loot(
    danger_level: DangerLevel,
    biome: Biome,
    context: LootContext,
    stream: &mut RngStream,
) -> LootRoll {
    let tier = weighted_pick(&tier_weights(danger_level, context), stream);
    let item_id = pick_item(biome, tier, stream);
    log::debug!(
        target: LOG_TARGET_LOOT,
        "rolled {item_id} ({tier:?}) for {biome} at danger {}",
        danger_level.get()
    );
    LootRoll {
        tier,
        item_id: item_id.to_string(),
    }
}

/// Loot request for one room of a slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceLootRequest<'a> {
    pub scope: RoomScope<'a>,
    pub biome: Biome,
    pub danger_level: DangerLevel,
    /// Resource nodes never yield junk-tier items.
    pub for_node: bool,
}

/// Exploration loot, seeded by the room so revisits reproduce the same roll.
#[must_use]
pub fn roll_slice_loot(request: &SliceLootRequest<'_>, algo: RngAlgo) -> LootRoll {
    let mut stream = RngStream::from_seed(slice_loot_seed(&request.scope), algo);
    let weights = tier_weights(request.danger_level, LootContext::Slice);
    let mut tier = weighted_pick(&weights, &mut stream);
    if request.for_node && tier == Tier::T0 {
        tier = Tier::T1;
    }
    let item_id = pick_item(request.biome, tier, &mut stream);
    LootRoll {
        tier,
        item_id: item_id.to_string(),
    }
}
