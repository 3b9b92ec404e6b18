use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fmt::Display;

/// Seed used when shuffling is requested without an explicit seed.
pub const DEFAULT_SEED: u64 = 1234;

/// How the edges are ordered before being inserted in a trapezoidal map.
///
/// The expected *O*(*n* log(*n*)) construction time and *O*(log(*n*)) query time only hold when
/// the insertion order is random. Both random strategies are seeded, so a given polygon always
/// produces the same map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shuffle {
    /// Insert the edges in the order of the polygon.
    None,
    /// Shuffle with the portable linear congruential generator [`Lcg`].
    Lcg { seed: u64 },
    /// Shuffle with a ChaCha8 generator.
    ChaCha8 { seed: u64 },
}

impl Default for Shuffle {
    fn default() -> Self {
        Shuffle::Lcg { seed: DEFAULT_SEED }
    }
}

impl Display for Shuffle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shuffle::None => write!(f, "none"),
            Shuffle::Lcg { seed } => write!(f, "lcg (seed {})", seed),
            Shuffle::ChaCha8 { seed } => write!(f, "chacha8 (seed {})", seed),
        }
    }
}

impl Shuffle {
    /// Permutes `items` in place according to the strategy.
    pub fn apply<T>(&self, items: &mut [T]) {
        match *self {
            Shuffle::None => {}
            Shuffle::Lcg { seed } => Lcg::new(seed).shuffle(items),
            Shuffle::ChaCha8 { seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                items.shuffle(&mut rng);
            }
        }
    }
}

/// Linear congruential random number generator.
///
/// This is not particularly random, but it is perfectly adequate to shuffle edges, and it yields
/// the same sequence on every platform regardless of any other random number use.
/// Coefficients are taken from Numerical Recipes in C.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const M: u64 = 21870;
    const A: u64 = 1291;
    const C: u64 = 4621;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % Self::M,
        }
    }

    /// Returns a random integer in the range `0..max_value`.
    pub fn uint(&mut self, max_value: u64) -> u64 {
        self.state = (self.state * Self::A + Self::C) % Self::M;
        (u128::from(self.state) * u128::from(max_value) / u128::from(Self::M)) as u64
    }

    /// Fisher-Yates shuffle: each item from the second one on is swapped with a random item
    /// among those before it (itself included).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in 1..items.len() {
            let j = self.uint(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}
