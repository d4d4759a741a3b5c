use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Deref;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> PartialEq<Self> for BigUintExt<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deref().eq(other.deref())
    }
}

impl<T: Borrow<BigUint>> Eq for BigUintExt<T> {}

impl<T: Borrow<BigUint>> PartialOrd<Self> for BigUintExt<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Borrow<BigUint>> Ord for BigUintExt<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deref().cmp(other.deref())
    }
}

impl<T: Borrow<BigUint>> PartialEq<BigUint> for BigUintExt<T> {
    fn eq(&self, other: &BigUint) -> bool {
        self.deref().eq(other)
    }
}

impl<T: Borrow<BigUint>> PartialOrd<BigUint> for BigUintExt<T> {
    fn partial_cmp(&self, other: &BigUint) -> Option<Ordering> {
        self.deref().partial_cmp(other)
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// <<算法导论>>
    /// 扩展欧几里得算法: 维护余数对`(r, new_r)`与系数对`(t, new_t)`, 每轮`q = r / new_r`,
    /// `new_t = t - q * new_t`, `new_r = r - q * new_r`, 直到`new_r = 0`. 此时`r = gcd(self, modulus)`.
    ///
    /// self * inv = 1 \mod modulus, `gcd(self, modulus) != 1`或`modulus = 0`时返回None
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let n = BigInt::from(modulus.clone());
        let (mut t, mut new_t) = (BigInt::zero(), BigInt::one());
        let (mut r, mut new_r) = (n.clone(), BigInt::from(self.deref().clone()));

        while !new_r.is_zero() {
            let q = &r / &new_r;

            let next_t = &t - &q * &new_t;
            t = std::mem::replace(&mut new_t, next_t);

            let next_r = &r - &q * &new_r;
            r = std::mem::replace(&mut new_r, next_r);
        }

        if !r.is_one() {
            return None;
        }

        // t可能为负数, 调整到[0, modulus)
        t.mod_floor(&n).to_biguint()
    }

    // 生成[0..self)之间的随机数, self为0时返回0
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        let bits = self.bits() as usize;
        if bits == 0 {
            return BigUint::zero();
        }

        let (mut n, top) = (vec![0u8; (bits + 7) >> 3], bits & 7);
        loop {
            rng.rand(n.as_mut_slice());
            // 清除大于bits的位, 降低拒绝采样的次数
            if top != 0 {
                if let Some(x) = n.last_mut() {
                    *x &= (1u8 << top) - 1;
                }
            }

            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return r;
            }
        }
    }

    /// 在闭区间`[low, self]`中均匀的生成随机数, `low > self`时返回None
    pub fn gen_range<R: Rand>(&self, low: &BigUint, rng: &mut R) -> Option<BigUint> {
        if low > self.deref() {
            return None;
        }

        let span = BigUintExt(self.deref() - low + 1u32);
        Some(span.gen_random(rng) + low)
    }

    /// Miller-Rabin probabilistic prime test.
    ///
    /// `test_rounds` random witnesses are drawn from `[2, n-2]`, at least one round is always run.
    /// For a composite `n` the probability of a false `true` is at most $4^{-rounds}$.
    /// Values below 2 and even values above 2 are rejected without drawing any witness.
    pub fn probably_prime_test<Rng: Rand>(&self, test_rounds: usize, rng: &mut Rng) -> bool {
        let n = self.deref();
        if n <= &BigUint::one() {
            return false;
        } else if n.bits() <= 2 {
            // 2, 3
            return true;
        } else if n.is_even() {
            return false;
        }

        // n - 1 = d * 2^s, d是奇数
        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> s;
        let (n_m2, two) = (BigUintExt(n - 2u32), BigUint::from(2u8));

        for _ in 0..test_rounds.max(1) {
            let Some(a) = n_m2.gen_range(&two, rng) else {
                return false;
            };

            if self.miller_rabin_witness(s, &d, &n_m1, &a) {
                return false;
            }
        }

        true
    }

    /// 判断`a`是否能证明`n`是合数, n - 1 = 2^s * d.
    /// 序列a^d, a^{2d}, ..., a^{2^{s-1}d} (mod n)中, 首项不为1且所有项都不为n-1时, n是合数.
    fn miller_rabin_witness(&self, s: u64, d: &BigUint, n_m1: &BigUint, a: &BigUint) -> bool {
        let n = self.deref();
        let mut x = a.modpow(d, n);
        if x.is_one() || &x == n_m1 {
            return false;
        }

        for _ in 1..s {
            x = &x * &x % n;
            if &x == n_m1 {
                return false;
            }
        }

        true
    }
}

impl BigUintExt<BigUint> {
    /// 生成恰好`bits_len`位的奇数候选值: 最高位置1保证位长, 最低位置1保证奇数.
    pub fn prime_candidate<Rng: Rand>(bits_len: usize, rng: &mut Rng) -> Result<BigUint, String> {
        if bits_len < 2 {
            return Err("prime size must at least 2-bits".to_string());
        }

        let (mut p, b) = (
            vec![0u8; (bits_len + 7) >> 3],
            if (bits_len & 7) == 0 { 8 } else { bits_len & 7 },
        );
        rng.rand(p.as_mut_slice());

        if let Some(x) = p.last_mut() {
            if b != 8 {
                *x &= (1u8 << b) - 1;
            }
            *x |= 1 << (b - 1);
        }

        if let Some(x) = p.first_mut() {
            *x |= 1;
        }

        Ok(BigUint::from_bytes_le(p.as_slice()))
    }

    /// 不断生成候选值并用Miller-Rabin测试, 直到找到素数为止. 不限制尝试次数,
    /// 需要截止时间或者次数限制时, 调用方自行组合`prime_candidate`与`probably_prime_test`.
    pub fn generate_prime<Rng: Rand>(
        bits_len: usize,
        test_round_num: usize,
        rng: &mut Rng,
    ) -> Result<BigUint, String> {
        loop {
            let candidate = Self::prime_candidate(bits_len, rng)?;
            if BigUintExt(&candidate).probably_prime_test(test_round_num, rng) {
                return Ok(candidate);
            }
        }
    }
}
