//! Injectable randomness for query synthesis.
//!
//! Every random choice made by the generator and the oracle goes through the
//! [`Randomness`] trait:
//! - **Runs**: [`SeededRng`] wraps a seedable `SmallRng`, so a failing seed
//!   replays the same queries. Workers get independent streams via
//!   [`SeededRng::fork`].
//! - **Tests**: [`ScriptedRng`] replays a fixed sequence of draws so a test
//!   can pin the exact shape of what gets generated.
//!
//! Use `<R: Randomness>` generic parameters, not `&mut dyn Randomness`.

use rand::rngs::SmallRng;
use rand::{Rng as _, RngCore, SeedableRng};

/// Source of random choices.
pub trait Randomness {
    /// Generates a random `u64`.
    fn next_u64(&mut self) -> u64;

    /// Generates a random `bool`.
    #[inline]
    fn next_bool(&mut self) -> bool {
        self.next_u64() % 2 == 1
    }

    /// Generates a random `usize` in `[0, max)`.
    #[inline]
    fn next_usize(&mut self, max: usize) -> usize {
        debug_assert!(max > 0, "max must be > 0");
        (self.next_u64() % max as u64) as usize
    }

    /// Generates a random `i64` in `[min, max)`.
    #[inline]
    fn next_i64_range(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min < max, "min must be < max");
        let span = max.abs_diff(min);
        min.wrapping_add((self.next_u64() % span) as i64)
    }

    /// Picks one element uniformly, `None` for an empty slice.
    #[inline]
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            items.get(self.next_usize(items.len()))
        }
    }
}

/// Seeded, reproducible random source.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: SmallRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derives an independent stream, deterministically from this one.
    pub fn fork(&mut self) -> SeededRng {
        SeededRng::new(self.inner.next_u64())
    }
}

impl Randomness for SeededRng {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    #[inline]
    fn next_bool(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    #[inline]
    fn next_usize(&mut self, max: usize) -> usize {
        self.inner.gen_range(0..max)
    }

    #[inline]
    fn next_i64_range(&mut self, min: i64, max: i64) -> i64 {
        self.inner.gen_range(min..max)
    }
}

/// Replays a fixed script of draws, cycling when it runs out.
///
/// Each draw is reduced modulo the requested range, so a script of choice
/// indices drives the generator down a known path.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    script: Vec<u64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(script: impl Into<Vec<u64>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// Number of draws taken so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Randomness for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value
    }
}
