//! FNV-1a hashing and seed derivation.
//!
//! Every procedural decision in the core starts from a 32-bit seed built
//! here. Strings are folded over their UTF-16 code units so that seeds match
//! across clients regardless of host language; all arithmetic wraps at 32 bits.

use crate::constants::{
    FNV_OFFSET_BASIS, FNV_PRIME, LOG_TARGET_SEED, SCOPE_AMBUSH, SCOPE_LOOT, TILE_HASH_X_PRIME,
    TILE_HASH_Y_PRIME,
};

#[inline]
const fn fold(hash: u32, unit: u32) -> u32 {
    (hash ^ unit).wrapping_mul(FNV_PRIME)
}

fn fold_str(mut hash: u32, text: &str) -> u32 {
    for unit in text.encode_utf16() {
        hash = fold(hash, u32::from(unit));
    }
    hash
}

/// Standard 32-bit FNV-1a over the UTF-16 code units of `text`.
#[must_use]
pub fn fnv1a(text: &str) -> u32 {
    fold_str(FNV_OFFSET_BASIS, text)
}

/// One heterogeneous input to [`hash_combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPart<'a> {
    Num(u32),
    Str(&'a str),
}

impl SeedPart<'_> {
    fn value(self) -> u32 {
        match self {
            Self::Num(value) => value,
            Self::Str(text) => fnv1a(text),
        }
    }
}

impl From<u32> for SeedPart<'_> {
    fn from(value: u32) -> Self {
        Self::Num(value)
    }
}

impl From<i32> for SeedPart<'_> {
    fn from(value: i32) -> Self {
        Self::Num(value.cast_unsigned())
    }
}

impl<'a> From<&'a str> for SeedPart<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

/// Fold numbers and strings into one seed, starting from the FNV offset basis.
#[must_use]
pub fn hash_combine(parts: &[SeedPart<'_>]) -> u32 {
    parts
        .iter()
        .fold(FNV_OFFSET_BASIS, |hash, part| fold(hash, part.value()))
}

/// Canonical per-tile seed for `(world_seed, shard_id, x, y)`.
///
/// The output is part of the cross-client contract; the golden vectors in the
/// tests must never change.
#[must_use]
pub fn hash2(world_seed: u32, shard_id: &str, x: i32, y: i32) -> u32 {
    let mut hash = fold_str(FNV_OFFSET_BASIS ^ world_seed, shard_id);
    hash = fold(hash, x.wrapping_mul(TILE_HASH_X_PRIME).cast_unsigned());
    fold(hash, y.wrapping_mul(TILE_HASH_Y_PRIME).cast_unsigned())
}

/// Domain separation: turn `seed` into an unrelated seed for `label`.
#[must_use]
pub fn derive(seed: u32, label: &str) -> u32 {
    fold_str(seed, label)
}

/// Seed scoping a single ambush decision to tile and player.
#[must_use]
pub fn ambush_seed(world_seed: u32, shard_id: &str, x: i32, y: i32, player_id: &str) -> u32 {
    let tile = hash2(world_seed, shard_id, x, y);
    let seed = hash_combine(&[
        SeedPart::Str(SCOPE_AMBUSH),
        SeedPart::Num(tile),
        SeedPart::Str(player_id),
    ]);
    log::debug!(target: LOG_TARGET_SEED, "ambush seed {seed:#010x} for tile ({x},{y}) shard {shard_id}");
    seed
}

/// Coordinates identifying one room inside a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomScope<'a> {
    pub world_seed: u32,
    pub shard_id: &'a str,
    pub tile_x: i32,
    pub tile_y: i32,
    pub room_x: i32,
    pub room_y: i32,
    pub player_id: &'a str,
}

/// Seed scoping slice/exploration loot to one room of one tile.
#[must_use]
pub fn slice_loot_seed(scope: &RoomScope<'_>) -> u32 {
    let tile = hash2(scope.world_seed, scope.shard_id, scope.tile_x, scope.tile_y);
    hash_combine(&[
        SeedPart::Str(SCOPE_LOOT),
        SeedPart::Num(tile),
        SeedPart::from(scope.room_x),
        SeedPart::from(scope.room_y),
        SeedPart::Str(scope.player_id),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(""), 0x811C_9DC5);
        assert_eq!(fnv1a("a"), 0xE40C_292C);
        assert_eq!(fnv1a("foobar"), 0xBF9C_F968);
    }

    #[test]
    fn hash2_golden_vectors() {
        assert_eq!(hash2(12_345, "shard-alpha", 3, 7), 0xE92B_7985);
        assert_eq!(hash2(0, "", 0, 0), 0x1176_97CD);
        assert_eq!(hash2(0xDEAD_BEEF, "isle", -4, 19), 0xFAC8_F156);
    }

    #[test]
    fn hash2_is_sensitive_to_every_input() {
        let base = hash2(9, "s", 1, 2);
        assert_ne!(base, hash2(10, "s", 1, 2));
        assert_ne!(base, hash2(9, "t", 1, 2));
        assert_ne!(base, hash2(9, "s", 2, 1));
    }

    #[test]
    fn derive_separates_purposes() {
        let seed = 0x1234_ABCD;
        assert_eq!(derive(seed, "mobs"), 0x022F_6ABA);
        assert_eq!(derive(seed, "loot"), 0x1A00_A84F);
        assert_eq!(derive(seed, "resources"), 0x6703_441A);
        assert_eq!(derive(seed, "layout"), 0x7A3D_AB17);
        assert_eq!(derive(seed, ""), seed);
    }

    #[test]
    fn combine_mixes_strings_and_numbers() {
        let parts = [SeedPart::from("AMBUSH"), SeedPart::from(7_u32), SeedPart::from("p1")];
        assert_eq!(hash_combine(&parts), 0xDDD2_F561);
        assert_eq!(hash_combine(&[]), 0x811C_9DC5);
    }

    #[test]
    fn ambush_seed_depends_on_player() {
        let a = ambush_seed(1, "shard", 4, 4, "alice");
        let b = ambush_seed(1, "shard", 4, 4, "bob");
        assert_ne!(a, b);
        assert_eq!(a, ambush_seed(1, "shard", 4, 4, "alice"));
    }

    #[test]
    fn room_scope_separates_rooms() {
        let scope = RoomScope {
            world_seed: 77,
            shard_id: "shard",
            tile_x: 2,
            tile_y: 3,
            room_x: 0,
            room_y: 0,
            player_id: "p",
        };
        let other = RoomScope { room_x: 1, ..scope };
        assert_ne!(slice_loot_seed(&scope), slice_loot_seed(&other));
    }
}
