//! RNG module - deterministic piece selection
//!
//! Every game owns a seeded LCG so a run can be replayed exactly from its seed.
//! Piece selection is uniform over the six shapes (no bag).

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    seed: u32,
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { seed, state }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high half of the state; the low bits of an LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max
    }

    /// Pick one of the six piece kinds
    pub fn next_piece(&mut self) -> PieceKind {
        let idx = self.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }
}
