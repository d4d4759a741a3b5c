//! Random byte sources shared by the prime search, the Miller-Rabin witnesses
//! and the per-message nonces.

pub trait Rand: Default {
    fn rand(&mut self, random: &mut [u8]);
}

mod default_rand;
pub use default_rand::{DefaultRand, SeededRand};
