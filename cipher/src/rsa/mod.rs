//! RSA
//!
//! - 随机选择两个位长为$bits/2$的质数$p$和$q$($p\neq q$), 则模数$n=p*q$;
//! - 公钥指数固定为$e=65537$, 要求$gcd(e, (p-1)(q-1)) = 1$;
//! - 私钥指数$d$满足: $d*e \equiv 1 \mod (p-1)(q-1)$, 不存在时重新生成全部素数;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$;
//!
//! 原理: 欧拉定理$a^{\phi(n)} \equiv 1 \mod n$
//! - $x ^ {k(p-1)(q-1)+1} \equiv x \mod n$
//!
//! 这里不做任何填充(PKCS1/OAEP), 输入值隐式的按模$n$约简, 不会因超出$[0, n)$而被拒绝.

use num_bigint::BigUint;
use utils::BigUintExt;

mod key;
pub use key::{KeyPair, PublicKey};

mod keygen;
pub use keygen::{KeyGenerator, DEFAULT_TEST_ROUNDS, MIN_BITS_LEN, PUBLIC_EXPONENT};

/// $m^e \mod n$, `n`不能为0
pub fn encrypt(m: &BigUint, e: &BigUint, n: &BigUint) -> BigUint {
    m.modpow(e, n)
}

/// $c^d \mod n$, `n`不能为0
pub fn decrypt(c: &BigUint, d: &BigUint, n: &BigUint) -> BigUint {
    c.modpow(d, n)
}

/// $e * d \equiv 1 \mod phi$, 返回$d \in [0, phi)$.
///
/// 逆元不存在时返回0. 对于$phi > 1$, 0永远不是合法的逆元, 调用方应当把0视为"重新生成密钥".
pub fn mod_inverse(e: &BigUint, phi: &BigUint) -> BigUint {
    BigUintExt(e).modinv(phi).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{decrypt, encrypt, mod_inverse};
    use num_bigint::BigUint;
    use num_traits::{One, Zero};

    #[test]
    fn mod_inverse_sentinel() {
        let (e, phi) = (BigUint::from(65537u32), BigUint::from(65537u32 * 6));
        assert!(mod_inverse(&e, &phi).is_zero());
        assert!(mod_inverse(&BigUint::from(4u32), &BigUint::from(10u32)).is_zero());
        assert!(mod_inverse(&e, &BigUint::zero()).is_zero());

        let phi = BigUint::from(3120u32);
        let d = mod_inverse(&BigUint::from(17u32), &phi);
        assert_eq!(d, BigUint::from(2753u32));
        assert!((BigUint::from(17u32) * d % phi).is_one());
    }

    #[test]
    fn textbook_rsa() {
        // p = 61, q = 53
        let (n, e, d) = (
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(2753u32),
        );
        for m in 0u32..3233 {
            let m = BigUint::from(m);
            let c = encrypt(&m, &e, &n);
            assert!(c < n);
            assert_eq!(decrypt(&c, &d, &n), m);
        }

        assert_eq!(
            encrypt(&BigUint::from(65u32), &e, &n),
            BigUint::from(2790u32)
        );
    }
}
