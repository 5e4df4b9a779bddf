// src/chat/random.rs
// Per-request randomness, injectable so tests can pin persona, fallback and delay draws

use rand::SeedableRng;
use rand::rngs::StdRng;

pub trait RandomSource: Send + Sync {
    /// A fresh generator for one request.
    fn rng(&self) -> StdRng;
}

/// Seeds every request from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn rng(&self) -> StdRng {
        StdRng::from_os_rng()
    }
}

/// Every request gets the same sequence.
#[derive(Debug, Clone, Copy)]
pub struct SeededRandom(pub u64);

impl RandomSource for SeededRandom {
    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}
