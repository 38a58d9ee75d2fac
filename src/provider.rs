//! Randomized piece sequencing.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::grid::{Cell, NUM_TETROMINOES};
use crate::tetromino::{tetromino, tetrominoes, Tetromino};

/// Source of falling pieces for the game state machine.
pub trait PieceProvider {
    fn next(&mut self) -> Tetromino;

    /// Returns the provider to its freshly constructed state.
    fn reset(&mut self);
}

// ============================================================================
// 7-bag randomizer
// ============================================================================

/// "7-bag" provider: one instance of each shape, drawn in a uniformly random
/// order, reshuffled whenever the bag runs out. Any run of 7 draws aligned to
/// a reshuffle boundary contains each shape exactly once, so no shape can
/// repeat more than twice in a row and long-run frequencies are uniform.
pub struct BagProvider {
    bag: [Tetromino; NUM_TETROMINOES],
    index: usize,
    rng: StdRng,
}

impl BagProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut provider = Self {
            bag: tetrominoes().clone(),
            index: 0,
            rng,
        };
        provider.reshuffle();
        provider
    }

    fn reshuffle(&mut self) {
        self.bag.shuffle(&mut self.rng);
        self.index = 0;
    }
}

impl Default for BagProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for BagProvider {
    fn next(&mut self) -> Tetromino {
        if self.index >= self.bag.len() {
            self.reshuffle();
        }
        let piece = self.bag[self.index].clone();
        self.index += 1;
        piece
    }

    fn reset(&mut self) {
        self.rng = StdRng::from_entropy();
        self.reshuffle();
    }
}

// ============================================================================
// Deterministic sequence for tests
// ============================================================================

/// Cycles through a fixed list of shapes. Test seam; never used in play.
pub struct SequenceProvider {
    kinds: Vec<Cell>,
    index: usize,
}

impl SequenceProvider {
    pub fn new(kinds: Vec<Cell>) -> Self {
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequenceProvider {
    fn next(&mut self) -> Tetromino {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index += 1;
        tetromino(kind)
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}
