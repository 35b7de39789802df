use crate::direction::Direction;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Picks one direction out of a candidate set.
/// Returns `None` only when `candidates` is empty.
pub trait Chooser {
    fn choose(&mut self, candidates: &[Direction]) -> Option<Direction>;
}

/// Uniform choice backed by a `rand` generator.
pub struct RandomChooser<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomChooser<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomChooser<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Chooser for RandomChooser<R> {
    fn choose(&mut self, candidates: &[Direction]) -> Option<Direction> {
        candidates.choose(&mut self.rng).copied()
    }
}

/// Always takes the first candidate. Handy for reproducing a walk by hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChoice;

impl Chooser for FirstChoice {
    fn choose(&mut self, candidates: &[Direction]) -> Option<Direction> {
        candidates.first().copied()
    }
}
