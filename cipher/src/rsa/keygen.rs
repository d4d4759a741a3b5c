use crate::rsa::KeyPair;
use crate::{CipherError, Rand};
use num_bigint::BigUint;
use std::time::{Duration, Instant};
use utils::BigUintExt;

/// 小于该位长时, 位长为`bits/2`的素数太少, 无法保证能找到两个不同的素数
pub const MIN_BITS_LEN: usize = 16;

pub const PUBLIC_EXPONENT: u32 = 65537;

pub const DEFAULT_TEST_ROUNDS: usize = 10;

/// RSA key pair builder.
///
/// The prime search has no worst-case bound, so the caller may cap the number of
/// prime candidates drawn across the whole generation and/or set a deadline.
/// Without either limit `generate` retries until it succeeds.
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    bits_len: usize,
    test_rounds: usize,
    max_candidates: Option<usize>,
    timeout: Option<Duration>,
}

struct Budget {
    drawn: usize,
    start: Instant,
    max_candidates: Option<usize>,
    timeout: Option<Duration>,
}

impl Budget {
    fn charge(&mut self) -> Result<(), CipherError> {
        if let Some(t) = self.timeout {
            if self.start.elapsed() >= t {
                return Err(CipherError::KeyGenTimeout(t));
            }
        }

        if let Some(max) = self.max_candidates {
            if self.drawn >= max {
                return Err(CipherError::KeyGenExhausted {
                    candidates: self.drawn,
                });
            }
        }

        self.drawn += 1;
        Ok(())
    }
}

impl KeyGenerator {
    pub fn new(bits_len: usize) -> Self {
        Self {
            bits_len,
            test_rounds: DEFAULT_TEST_ROUNDS,
            max_candidates: None,
            timeout: None,
        }
    }

    /// Miller-Rabin rounds per candidate, at least 1
    pub fn rounds(mut self, test_rounds: usize) -> Self {
        self.test_rounds = test_rounds.max(1);
        self
    }

    pub fn max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = Some(max_candidates);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bits_len(&self) -> usize {
        self.bits_len
    }

    /// 1. p, q为`bits/2`位的素数, q与p相同时重新选取q;
    /// 2. n = p * q, phi = (p-1)(q-1), e = 65537;
    /// 3. d = e^{-1} mod phi, 逆元不存在时重新选取全部素数.
    pub fn generate<R: Rand>(&self, rng: &mut R) -> Result<KeyPair, CipherError> {
        if self.bits_len < MIN_BITS_LEN {
            return Err(CipherError::InvalidBitsLen {
                min: MIN_BITS_LEN,
                real: self.bits_len,
            });
        }

        let mut budget = Budget {
            drawn: 0,
            start: Instant::now(),
            max_candidates: self.max_candidates,
            timeout: self.timeout,
        };
        let (half, e) = (self.bits_len / 2, BigUint::from(PUBLIC_EXPONENT));

        loop {
            let p = self.next_prime(half, &mut budget, rng)?;
            let mut q = self.next_prime(half, &mut budget, rng)?;
            while q == p {
                log::trace!("rsa: drew the same prime twice, resample q");
                q = self.next_prime(half, &mut budget, rng)?;
            }

            let n = &p * &q;
            let phi = (p - 1u32) * (q - 1u32);

            match BigUintExt(&e).modinv(&phi) {
                Some(d) => {
                    log::debug!(
                        "rsa: generated {}-bits modulus after {} prime candidates",
                        n.bits(),
                        budget.drawn
                    );
                    return Ok(KeyPair::new_uncheck(n, e, d));
                }
                None => {
                    log::trace!("rsa: e is not invertible modulo phi, restart key generation");
                }
            }
        }
    }

    fn next_prime<R: Rand>(
        &self,
        bits_len: usize,
        budget: &mut Budget,
        rng: &mut R,
    ) -> Result<BigUint, CipherError> {
        loop {
            budget.charge()?;
            let candidate =
                BigUintExt::<BigUint>::prime_candidate(bits_len, rng).map_err(CipherError::Other)?;
            if BigUintExt(&candidate).probably_prime_test(self.test_rounds, rng) {
                return Ok(candidate);
            }
        }
    }
}
