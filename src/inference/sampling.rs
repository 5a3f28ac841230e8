//! Injectable sampling source.
//!
//! Inference and column statistics both draw random samples. Production code uses
//! [`RandomSampler::from_entropy`]; tests pin the sample with [`RandomSampler::seeded`] or
//! [`HeadSampler`].

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Chooses which rows end up in a sample.
pub trait Sampler {
    /// Pick `amount` distinct indexes from `0..len`, without replacement.
    ///
    /// `amount` is clamped to `len`.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Non-deterministic sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Sampler for RandomSampler {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

/// Deterministic sampler that always takes the first `amount` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadSampler;

impl Sampler for HeadSampler {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..amount.min(len)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn random_sample_is_distinct_and_bounded() {
        let mut sampler = RandomSampler::seeded(7);
        let picked = sampler.sample_indices(50, 20);
        assert_eq!(picked.len(), 20);
        let distinct: BTreeSet<usize> = picked.iter().copied().collect();
        assert_eq!(distinct.len(), 20);
        assert!(picked.iter().all(|&i| i < 50));
    }

    #[test]
    fn amount_is_clamped_to_population() {
        assert_eq!(RandomSampler::seeded(1).sample_indices(3, 10).len(), 3);
        assert_eq!(HeadSampler.sample_indices(3, 10), vec![0, 1, 2]);
        assert!(HeadSampler.sample_indices(0, 5).is_empty());
    }

    #[test]
    fn same_seed_same_sample() {
        let a = RandomSampler::seeded(42).sample_indices(1_000, 10);
        let b = RandomSampler::seeded(42).sample_indices(1_000, 10);
        assert_eq!(a, b);
    }
}
