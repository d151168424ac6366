//! Seedable random number generation for the table session.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical shuffles (tests, replays)
//! - **Context streams**: Independent sequences for shuffling vs id synthesis
//! - **Unbiased shuffle**: Explicit Fisher–Yates over slices and `im::Vector`
//!
//! ```
//! use solo_table::core::TableRng;
//!
//! let mut rng = TableRng::new(42);
//! let mut cards = vec!['A', 'B', 'C', 'D', 'E'];
//! rng.shuffle(&mut cards);
//!
//! let mut again = TableRng::new(42);
//! let mut same = vec!['A', 'B', 'C', 'D', 'E'];
//! again.shuffle(&mut same);
//! assert_eq!(cards, same);
//! ```

use im::Vector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Deterministic RNG backing every random decision on the table.
///
/// Uses ChaCha8 for speed while keeping high-quality output, so that every
/// permutation of the deck is reachable and equally likely.
#[derive(Clone, Debug)]
pub struct TableRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl TableRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this RNG started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork this RNG to create an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// Keeps id synthesis from perturbing the shuffle sequence.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
            fork_counter: 0,
        }
    }

    /// Uniform index in `0..=max`.
    pub fn index_through(&mut self, max: usize) -> usize {
        self.inner.gen_range(0..=max)
    }

    /// Random 32-bit word.
    pub fn next_u32(&mut self) -> u32 {
        self.inner.gen()
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        self.fisher_yates(slice.len(), |i, j| slice.swap(i, j));
    }

    /// Shuffle a persistent vector in place.
    pub fn shuffle_vector<T: Clone>(&mut self, seq: &mut Vector<T>) {
        self.fisher_yates(seq.len(), |i, j| seq.swap(i, j));
    }

    /// Knuth shuffle: for `i` from last to first, swap with a uniform
    /// index in `[0, i]`.
    fn fisher_yates(&mut self, len: usize, mut swap: impl FnMut(usize, usize)) {
        for i in (1..len).rev() {
            let j = self.index_through(i);
            if i != j {
                swap(i, j);
            }
        }
    }
}
