//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling. This
//! prevents long droughts. A rare refill slips in one or two extra copies of
//! the friendlier pieces; the odds live in [`BagPolicy`].

use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Odds for the duplicate-piece refill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BagPolicy {
    /// Chance that a refill carries extra pieces
    pub duplicate_chance: f64,
    /// Given extras, chance of two instead of one
    pub second_duplicate_chance: f64,
}

impl Default for BagPolicy {
    fn default() -> Self {
        Self {
            duplicate_chance: 0.01,
            second_duplicate_chance: 0.2,
        }
    }
}

impl BagPolicy {
    /// Every refill is exactly one of each piece
    pub fn strict() -> Self {
        Self {
            duplicate_chance: 0.0,
            second_duplicate_chance: 0.0,
        }
    }
}

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Pieces left in the current refill, dealt from the back
    pieces: Vec<TetrominoType>,
    policy: BagPolicy,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from the thread RNG
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag with a fixed seed, for replays and tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_policy(seed, BagPolicy::default())
    }

    pub fn with_policy(seed: u64, policy: BagPolicy) -> Self {
        Self {
            pieces: Vec::with_capacity(9),
            policy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn set_policy(&mut self, policy: BagPolicy) {
        self.policy = policy;
    }

    /// Get the next piece, refilling first if the bag is empty
    pub fn next(&mut self) -> TetrominoType {
        loop {
            if let Some(piece) = self.pieces.pop() {
                return piece;
            }
            self.refill();
        }
    }

    /// Drop whatever is left so the next draw starts a fresh refill
    pub fn reset(&mut self) {
        self.pieces.clear();
    }

    /// Pieces still waiting in the current refill
    pub fn remaining(&self) -> usize {
        self.pieces.len()
    }

    /// Refill with one of each piece (plus rare extras) and shuffle
    fn refill(&mut self) {
        self.pieces.clear();
        self.pieces.extend(TetrominoType::all());

        if self.rng.gen_bool(odds(self.policy.duplicate_chance)) {
            let extras = if self.rng.gen_bool(odds(self.policy.second_duplicate_chance)) {
                2
            } else {
                1
            };
            let safe = TetrominoType::safe();
            for _ in 0..extras {
                self.pieces.push(safe[self.rng.gen_range(0..safe.len())]);
            }
        }

        self.pieces.shuffle(&mut self.rng);
    }
}

/// Probability usable by `gen_bool`; non-finite odds never fire
fn odds(chance: f64) -> f64 {
    if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
