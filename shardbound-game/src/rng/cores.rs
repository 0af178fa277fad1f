//! 32-bit PRNG cores backing [`super::RngStream`].
//!
//! All arithmetic wraps at 32 bits. Multiplications use `wrapping_mul` on
//! `u32`, which truncates exactly like a 32-bit integer multiply; never widen.

use crate::constants::{MULBERRY_INCREMENT, SPLITMIX_GAMMA, SPLITMIX_MIX_A, SPLITMIX_MIX_B};

/// Single-word generator (mulberry32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

/// Seed-expansion generator used to fill wider states and to fork streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix32 {
    state: u32,
}

impl SplitMix32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(SPLITMIX_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 16)).wrapping_mul(SPLITMIX_MIX_A);
        z = (z ^ (z >> 13)).wrapping_mul(SPLITMIX_MIX_B);
        z ^ (z >> 16)
    }
}

/// Four-word generator (xoshiro128**), seeded through [`SplitMix32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xoshiro128StarStar {
    s: [u32; 4],
}

impl Xoshiro128StarStar {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        let mut expander = SplitMix32::new(seed);
        let mut s = [
            expander.next_u32(),
            expander.next_u32(),
            expander.next_u32(),
            expander.next_u32(),
        ];
        // The all-zero state is a fixed point.
        if s[0] == 0 && s[1] == 0 && s[2] == 0 && s[3] == 0 {
            s[0] = SPLITMIX_GAMMA;
        }
        Self { s }
    }

    #[must_use]
    pub const fn from_state(s: [u32; 4]) -> Self {
        Self { s }
    }

    /// Fold of the four state words; stable between draws.
    #[must_use]
    pub const fn state_digest(&self) -> u32 {
        self.s[0] ^ self.s[1] ^ self.s[2] ^ self.s[3]
    }

    pub const fn next_u32(&mut self) -> u32 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 9;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(11);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mulberry_matches_reference_sequence() {
        let mut core = Mulberry32::new(0);
        assert_eq!(core.next_u32(), 0x4434_B462);
        assert_eq!(core.next_u32(), 0x0015_9C37);
        assert_eq!(core.next_u32(), 0x3928_5B08);

        let mut core = Mulberry32::new(42);
        assert_eq!(core.next_u32(), 0x99E1_EF7C);
        assert_eq!(core.next_u32(), 0x72C3_2B8A);
    }

    #[test]
    fn xoshiro_matches_reference_state_vector() {
        let mut core = Xoshiro128StarStar::from_state([1, 2, 3, 4]);
        assert_eq!(core.next_u32(), 11_520);
        assert_eq!(core.next_u32(), 0);
        assert_eq!(core.next_u32(), 5_927_040);
    }

    #[test]
    fn xoshiro_seeded_through_splitmix() {
        let mut core = Xoshiro128StarStar::new(42);
        assert_eq!(core.next_u32(), 0xA91E_1CAC);
        assert_eq!(core.next_u32(), 0x207B_36E9);
        assert_eq!(core.next_u32(), 0x1C98_7FFA);
        assert_eq!(core.next_u32(), 0xD09F_DE9E);
    }
}
