//! Picks, shuffles and distributions layered on the uniform draws.

use std::f64::consts::TAU;

use super::RngStream;
use crate::constants::POISSON_KNUTH_LIMIT;
use crate::numbers::{floor_f64_to_index, floor_f64_to_i64, usize_to_f64};

/// Sequential-subtraction selection for a pre-scaled roll.
///
/// Walks `items` in order subtracting each weight from `roll`; the first entry
/// that brings it to zero or below wins. When floating-point drift leaves the
/// roll positive after the last entry, the last entry is returned.
#[must_use]
pub fn select_weighted<T>(items: &[(T, f64)], roll: f64) -> Option<&T> {
    let (last, _) = items.last()?;
    let mut remaining = roll;
    for (item, weight) in items {
        remaining -= *weight;
        if remaining <= 0.0 {
            return Some(item);
        }
    }
    Some(last)
}

impl RngStream {
    /// Uniform element of `items`, or `None` when empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = floor_f64_to_index(self.float() * usize_to_f64(items.len()), items.len());
        items.get(idx)
    }

    /// Weighted pick: draws `r = float() * total` and hands it to
    /// [`select_weighted`].
    pub fn pick_weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let total: f64 = items.iter().map(|(_, weight)| *weight).sum();
        select_weighted(items, self.float() * total)
    }

    /// Fisher–Yates shuffle driven by [`RngStream::int`].
    pub fn shuffle_in_place<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index_below(i + 1);
            items.swap(i, j);
        }
    }

    /// Draw `count` elements, with or without replacement.
    ///
    /// Without replacement the result holds at most `items.len()` elements.
    pub fn sample<T: Clone>(&mut self, items: &[T], count: usize, replace: bool) -> Vec<T> {
        if items.is_empty() {
            return Vec::new();
        }
        if replace {
            return (0..count)
                .filter_map(|_| self.pick(items).cloned())
                .collect();
        }
        let take = count.min(items.len());
        let mut order: Vec<usize> = (0..items.len()).collect();
        for i in 0..take {
            let j = i + self.index_below(items.len() - i);
            order.swap(i, j);
        }
        order[..take].iter().map(|&idx| items[idx].clone()).collect()
    }

    /// Normal draw via Box–Muller; the paired value is cached for the next call.
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        if let Some(spare) = self.spare_gaussian.take() {
            return mean + std_dev * spare;
        }
        // 1 - float() lies in (0, 1], keeping ln() finite.
        let u1 = 1.0 - self.float();
        let u2 = self.float();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = TAU * u2;
        self.spare_gaussian = Some(radius * theta.sin());
        mean + std_dev * radius * theta.cos()
    }

    /// Exponential draw with rate `lambda`; non-positive rates yield 0.
    pub fn exp(&mut self, lambda: f64) -> f64 {
        if lambda <= 0.0 {
            return 0.0;
        }
        -(1.0 - self.float()).ln() / lambda
    }

    /// Poisson draw. Knuth's product method for small means, a rounded
    /// normal approximation above the limit.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if lambda.is_nan() || lambda <= 0.0 {
            return 0;
        }
        if lambda >= POISSON_KNUTH_LIMIT {
            let approx = self.gaussian(lambda, lambda.sqrt()).round();
            return u64::try_from(floor_f64_to_i64(approx).max(0)).unwrap_or(0);
        }
        let limit = (-lambda).exp();
        let mut count = 0_u64;
        let mut product = 1.0;
        loop {
            product *= self.float();
            if product <= limit {
                return count;
            }
            count += 1;
        }
    }

    /// Binomial draw as `trials` Bernoulli(`p`) outcomes.
    pub fn binomial(&mut self, trials: u32, p: f64) -> u32 {
        let p = p.clamp(0.0, 1.0);
        let mut successes = 0;
        for _ in 0..trials {
            if self.bool(p) {
                successes += 1;
            }
        }
        successes
    }

    fn index_below(&mut self, len: usize) -> usize {
        let upper = i64::try_from(len).unwrap_or(i64::MAX);
        usize::try_from(self.int(0, upper)).unwrap_or(0)
    }
}
