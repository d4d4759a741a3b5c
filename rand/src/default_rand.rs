use crate::Rand;
use xrand::rngs::{OsRng, StdRng};
use xrand::{RngCore, SeedableRng};

/// 默认使用OsRng <br>
///
/// Stateless handle, every session can own a copy without synchronisation.
#[derive(Copy, Clone, Default)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }
}

/// Reproducible byte stream, only meant for tests and benchmarks.
#[derive(Clone)]
pub struct SeededRand {
    rng: StdRng,
}

impl SeededRand {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRand {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Rand for SeededRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }
}
