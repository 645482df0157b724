//! Injectable strategies for seed numbers and match identifiers.
//!
//! Both traits are implemented for plain closures, so tests can pass
//! `|| 100` or a counter instead of the random defaults.

use rand::Rng;
use tracing::{debug, instrument};

/// Lowest seed the default generator produces.
pub const DEFAULT_SEED_MIN: i64 = 3;

/// Highest seed the default generator produces.
pub const DEFAULT_SEED_MAX: i64 = 100;

/// Produces the starting number of a match.
pub trait NumberGenerator: Send + Sync {
    /// Returns the next seed.
    fn generate(&self) -> i64;
}

impl<F> NumberGenerator for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn generate(&self) -> i64 {
        self()
    }
}

/// Uniform random seed in an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSeed {
    min: i64,
    max: i64,
}

impl UniformSeed {
    /// Creates a generator over `min..=max`.
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn new(min: i64, max: i64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> i64 {
        self.max
    }
}

impl Default for UniformSeed {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_MIN, DEFAULT_SEED_MAX)
    }
}

impl NumberGenerator for UniformSeed {
    #[instrument(skip(self), fields(min = self.min, max = self.max))]
    fn generate(&self) -> i64 {
        let seed = rand::thread_rng().gen_range(self.min..=self.max);
        debug!(seed, "Generated seed");
        seed
    }
}

/// Produces unique match identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
