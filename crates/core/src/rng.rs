//! RNG module - 7-bag piece randomizer
//!
//! Each bag holds one of each kind (I, J, L, O, S, T, Z) in a shuffled order.
//! Pieces are popped until the bag is empty, then a fresh bag is generated, so
//! any 7 consecutive pops aligned to a refill contain every kind exactly once.
//!
//! The shuffle is driven by a small seedable LCG so a game can be replayed from
//! its seed in tests.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Multiply-shift keeps the high bits; the low bits of an LCG cycle with
    /// short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Seed derived from the wall clock, for interactive games.
pub fn seed_from_time() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32 ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Return the 7 kinds in a uniformly random permutation.
pub fn generate_bag(rng: &mut SimpleRng) -> [PieceKind; 7] {
    let mut bag = PieceKind::ALL;
    rng.shuffle(&mut bag);
    bag
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    bag: [PieceKind; 7],
    /// Index of the next piece to pop; 7 means the bag is exhausted.
    cursor: usize,
    rng: SimpleRng,
}

impl PieceBag {
    /// Create an empty bag; the first `pop` generates the first permutation.
    pub fn new(seed: u32) -> Self {
        Self {
            bag: PieceKind::ALL,
            cursor: 7,
            rng: SimpleRng::new(seed),
        }
    }

    /// Pop the next kind, refilling with a freshly shuffled bag when empty.
    pub fn pop(&mut self) -> PieceKind {
        if self.cursor >= 7 {
            self.bag = generate_bag(&mut self.rng);
            self.cursor = 0;
        }

        let kind = self.bag[self.cursor];
        self.cursor += 1;
        kind
    }

    /// Current RNG state; seeding a new bag with it continues the sequence.
    pub fn seed(&self) -> u32 {
        self.rng.state
    }

    /// Kinds still left in the current bag, in pop order.
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.cursor.min(7)..]
    }
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_next_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(7);
        for max in 1..=7u32 {
            for _ in 0..200 {
                assert!(rng.next_range(max) < max);
            }
        }
    }

    #[test]
    fn test_generate_bag_is_a_permutation() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..50 {
            let mut bag = generate_bag(&mut rng);
            bag.sort();
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_new_bag_starts_empty() {
        let bag = PieceBag::new(1);
        assert!(bag.remaining().is_empty());
    }

    #[test]
    fn test_every_window_of_seven_pops_holds_each_kind_once() {
        let mut bag = PieceBag::new(2024);
        for _ in 0..20 {
            let mut window: Vec<PieceKind> = (0..7).map(|_| bag.pop()).collect();
            window.sort();
            assert_eq!(window, PieceKind::ALL.to_vec());
        }
    }

    #[test]
    fn test_remaining_shrinks_as_pieces_pop() {
        let mut bag = PieceBag::new(5);
        bag.pop();
        assert_eq!(bag.remaining().len(), 6);
        for _ in 0..6 {
            bag.pop();
        }
        assert!(bag.remaining().is_empty());
        bag.pop();
        assert_eq!(bag.remaining().len(), 6);
    }

    #[test]
    fn test_permutations_vary_across_refills() {
        let mut bag = PieceBag::new(3);
        let bags: Vec<Vec<PieceKind>> = (0..10)
            .map(|_| (0..7).map(|_| bag.pop()).collect())
            .collect();
        assert!(bags.windows(2).any(|w| w[0] != w[1]));
    }
}
