//! Seedable random sources
//!
//! Every spawn roll, shuffle and sample in the games goes through
//! [`RandomSource`], so a run is reproducible from its seed and tests can
//! force exact sequences with [`ScriptedRng`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform index in `0..n` (`n` must be non-zero)
    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        ((self.next_unit() * n as f32) as usize).min(n.saturating_sub(1))
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }
}

/// PCG-backed generator used for real runs
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: Pcg32,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn next_unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }
}

/// Replays a fixed cycle of samples
///
/// Values are clamped into `[0, 1)` so a script can never produce an
/// out-of-range index.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values: Vec<f32> = values.into();
        if values.is_empty() {
            values.push(0.0);
        }
        for v in &mut values {
            *v = v.clamp(0.0, 0.999_999);
        }
        Self { values, cursor: 0 }
    }

    /// A script that always returns the same sample
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRng {
    fn next_unit(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Pick from a weighted table by cumulative bucket
///
/// Buckets are scanned in table order; the first whose running total reaches
/// the roll wins. Rounding leftovers fall back to the first entry.
pub fn weighted_pick<T: Copy, R: RandomSource + ?Sized>(rng: &mut R, table: &[(T, f32)]) -> T {
    pick_bucket(rng.next_unit(), table, |roll, cumulative| roll <= cumulative)
}

/// Like [`weighted_pick`], but a roll equal to a bucket's upper edge falls
/// into the next bucket
pub fn weighted_pick_below<T: Copy, R: RandomSource + ?Sized>(
    rng: &mut R,
    table: &[(T, f32)],
) -> T {
    pick_bucket(rng.next_unit(), table, |roll, cumulative| roll < cumulative)
}

fn pick_bucket<T: Copy>(roll: f32, table: &[(T, f32)], hit: impl Fn(f32, f32) -> bool) -> T {
    let mut cumulative = 0.0;
    for &(item, weight) in table {
        cumulative += weight;
        if hit(roll, cumulative) {
            return item;
        }
    }
    table[0].0
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Draw `k` distinct indices from `0..population`, in draw order
pub fn sample_without_replacement<R: RandomSource + ?Sized>(
    rng: &mut R,
    population: usize,
    k: usize,
) -> Vec<usize> {
    let mut available: Vec<usize> = (0..population).collect();
    let mut drawn = Vec::with_capacity(k.min(population));
    for _ in 0..k.min(population) {
        let idx = rng.below(available.len());
        drawn.push(available.remove(idx));
    }
    drawn
}
