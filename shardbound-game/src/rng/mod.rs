//! Deterministic random streams.
//!
//! An [`RngStream`] owns its generator state outright; each procedural
//! purpose builds its own stream from a derived seed, so streams are never
//! shared between unrelated decisions. Two streams created from the same seed
//! and algorithm produce bit-identical output for the same call sequence.

mod cores;
mod sampling;

pub use cores::{Mulberry32, SplitMix32, Xoshiro128StarStar};
pub use sampling::select_weighted;

use serde::{Deserialize, Serialize};

use crate::constants::UNIT_DIVISOR;
use crate::hash_seed;
use crate::numbers::{floor_f64_to_i64, i64_to_f64};

/// Which generator core a stream runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RngAlgo {
    /// Single-word mulberry32.
    #[default]
    Mulberry32,
    /// Four-word xoshiro128** seeded through splitmix.
    Xoshiro128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Core {
    Mulberry(Mulberry32),
    Xoshiro(Xoshiro128StarStar),
}

/// A seeded random stream with uniform draws, picks and basic distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct RngStream {
    core: Core,
    spare_gaussian: Option<f64>,
}

impl RngStream {
    #[must_use]
    pub const fn from_seed(seed: u32, algo: RngAlgo) -> Self {
        let core = match algo {
            RngAlgo::Mulberry32 => Core::Mulberry(Mulberry32::new(seed)),
            RngAlgo::Xoshiro128 => Core::Xoshiro(Xoshiro128StarStar::new(seed)),
        };
        Self {
            core,
            spare_gaussian: None,
        }
    }

    #[must_use]
    pub const fn algo(&self) -> RngAlgo {
        match self.core {
            Core::Mulberry(_) => RngAlgo::Mulberry32,
            Core::Xoshiro(_) => RngAlgo::Xoshiro128,
        }
    }

    /// Current seed-equivalent of the state, without advancing it.
    #[must_use]
    pub const fn peek_seed(&self) -> u32 {
        match &self.core {
            Core::Mulberry(core) => core.state(),
            Core::Xoshiro(core) => core.state_digest(),
        }
    }

    pub const fn next_uint32(&mut self) -> u32 {
        match &mut self.core {
            Core::Mulberry(core) => core.next_u32(),
            Core::Xoshiro(core) => core.next_u32(),
        }
    }

    /// Uniform float in `[0, 1)`.
    pub fn float(&mut self) -> f64 {
        f64::from(self.next_uint32()) / UNIT_DIVISOR
    }

    /// Uniform float in `[low, high)`.
    pub fn float_in(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.float()
    }

    /// Uniform integer in `[low, high_exclusive)`; returns `low` for an empty range.
    pub fn int(&mut self, low: i64, high_exclusive: i64) -> i64 {
        if high_exclusive <= low {
            return low;
        }
        let span = high_exclusive - low;
        let offset = floor_f64_to_i64(self.float() * i64_to_f64(span));
        low + offset.clamp(0, span - 1)
    }

    /// `true` with probability `p`.
    pub fn bool(&mut self, p: f64) -> bool {
        self.float() < p
    }

    /// Child stream for a named purpose; the parent state is not advanced.
    #[must_use]
    pub fn derive(&self, label: &str) -> Self {
        Self::from_seed(hash_seed::derive(self.peek_seed(), label), self.algo())
    }

    /// `count` independent child streams expanded through splitmix from the
    /// current seed. The parent state is not advanced.
    #[must_use]
    pub fn fork(&self, count: usize) -> Vec<Self> {
        let mut expander = SplitMix32::new(self.peek_seed());
        let algo = self.algo();
        (0..count)
            .map(|_| Self::from_seed(expander.next_u32(), algo))
            .collect()
    }
}

impl rand::RngCore for RngStream {
    fn next_u32(&mut self) -> u32 {
        self.next_uint32()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_uint32());
        let low = u64::from(self.next_uint32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_uint32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
