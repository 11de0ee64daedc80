//! Deterministic game randomness.
//!
//! All randomized gameplay decisions (patrol headings, stage durations, wave
//! sizes, spawn positions, dialogue chance rolls) draw from one seeded stream
//! so a fixed seed replays a session exactly.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_SEED: u64 = 0x5EED_CAFE_F00D;

#[derive(Resource, Debug)]
pub struct GameRng(pub ChaCha8Rng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}
