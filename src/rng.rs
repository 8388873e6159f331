//! Shared, seedable random source.
//!
//! Every random decision in a game (combat dice, event chance, event choice,
//! event target) is drawn from one [`GameRng`]. Each draw is tagged with its
//! purpose and a running index and traced, so a game can be audited and
//! replayed exactly from its seed and its ordered decision inputs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Why a value was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPurpose {
    AttackerDie,
    DefenderDie,
    EventChance,
    EventSelection,
    EventTarget,
}

/// Seeded generator with a draw counter.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: SmallRng,
    seed: u64,
    draws: u64,
}

impl GameRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        GameRng {
            inner: SmallRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// A fair six-sided die.
    pub fn roll_d6(&mut self, purpose: DrawPurpose) -> u8 {
        let value = self.inner.gen_range(1..=6u8);
        self.record(purpose, u64::from(value));
        value
    }

    /// A uniform value in `1..=100`.
    pub fn percent(&mut self, purpose: DrawPurpose) -> u32 {
        let value = self.inner.gen_range(1..=100u32);
        self.record(purpose, u64::from(value));
        value
    }

    /// A uniform index in `0..len`. Returns `None` for an empty range
    /// without consuming a draw.
    pub fn index(&mut self, len: usize, purpose: DrawPurpose) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let value = self.inner.gen_range(0..len);
        self.record(purpose, value as u64);
        Some(value)
    }

    fn record(&mut self, purpose: DrawPurpose, value: u64) {
        self.draws += 1;
        tracing::trace!(draw = self.draws, ?purpose, value, "rng draw");
    }
}
