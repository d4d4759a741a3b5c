use crate::rsa::KeyGenerator;
use crate::{BlockDecrypt, BlockEncrypt, CipherError, Rand};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utils::BigUintExt;

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

/// 进程内生成一次, 之后只读. 多个会话共享同一个`KeyPair`时无需加锁.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyPair {
    pk: PublicKey,
    // d * e = 1 % (p-1)(q-1)
    d: BigUint,
}

impl PublicKey {
    /// n: RSA modules
    /// e: public key exponent
    /// note: not to check the `n` and `exp` are right RSA parameters
    pub fn new_uncheck(n: BigUint, exp: BigUint) -> Self {
        Self { e: exp, n }
    }

    /// n
    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// $m^e \mod n$
    pub fn encrypt(&self, m: &BigUint) -> BigUint {
        super::encrypt(m, &self.e, &self.n)
    }

    /// 在$[1, n-1]$之中均匀的选取nonce, 每条消息都需要重新生成
    pub fn random_nonce<R: Rand>(&self, rng: &mut R) -> Result<BigUint, CipherError> {
        let too_small = || {
            CipherError::InvalidPublicKey(format!(
                "rsa: modulus {} is too small to draw a nonce",
                self.n
            ))
        };

        if self.n.is_zero() {
            return Err(too_small());
        }

        BigUintExt(&self.n - 1u32)
            .gen_range(&BigUint::one(), rng)
            .ok_or_else(too_small)
    }

    /// 从对端收到的公钥在使用前需要检查, `modpow`不接受为0的模数
    pub fn is_valid(&self) -> Result<(), CipherError> {
        if self.n < BigUint::from(2u8) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: modulus {} is too small",
                self.n
            )))
        } else if self.e < BigUint::from(2u8) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public key {} is too small",
                self.e
            )))
        } else {
            Ok(())
        }
    }
}

impl KeyPair {
    pub fn new_uncheck(modulus: BigUint, public_exp: BigUint, private_exp: BigUint) -> Self {
        Self {
            pk: PublicKey::new_uncheck(modulus, public_exp),
            d: private_exp,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// d, 只能留在生成密钥的一方
    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    /// $c^d \mod n$
    pub fn decrypt(&self, c: &BigUint) -> BigUint {
        super::decrypt(c, &self.d, &self.pk.n)
    }

    /// `generate_key` generates an RSA keypair of the given bit size, it retries until a valid
    /// key pair is found. Use [`KeyGenerator`] to bound the search.
    ///
    /// `prime_test_rounds` means the number of Miller-Rabin rounds used for each prime candidate.
    pub fn generate_key<R: Rand>(
        bits_len: usize,
        prime_test_rounds: usize,
        rd: &mut R,
    ) -> Result<KeyPair, CipherError> {
        KeyGenerator::new(bits_len)
            .rounds(prime_test_rounds)
            .generate(rd)
    }
}

impl BlockEncrypt for PublicKey {
    fn encrypt_block(&self, plaintext: &BigUint) -> BigUint {
        self.encrypt(plaintext)
    }
}

impl BlockEncrypt for KeyPair {
    fn encrypt_block(&self, plaintext: &BigUint) -> BigUint {
        self.pk.encrypt(plaintext)
    }
}

impl BlockDecrypt for KeyPair {
    fn decrypt_block(&self, ciphertext: &BigUint) -> BigUint {
        self.decrypt(ciphertext)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{e={}, n={}}}", self.e, self.n)
    }
}

impl Display for KeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{pk: {}, d: {}}}", self.pk, self.d)
    }
}

#[cfg(test)]
mod tests {
    use crate::rsa::{KeyPair, PublicKey};
    use crate::{DefaultRand, SeededRand};
    use num_bigint::BigUint;
    use num_traits::{Num, One, Zero};
    use utils::BigUintExt;

    fn gnu_tls_key() -> KeyPair {
        let n = BigUint::from_str_radix("290684273230919398108010081414538931343", 10).unwrap();
        let e = BigUint::from(65537u32);
        let d = BigUint::from_str_radix("31877380284581499213530787347443987241", 10).unwrap();
        KeyPair::new_uncheck(n, e, d)
    }

    fn key_basics(key: &KeyPair) {
        key.public_key().is_valid().unwrap();
        assert!(
            key.private_exponent() < key.public_key().modules(),
            "private exponent too large"
        );
        let m = BigUint::from(42u32);
        let c = key.public_key().encrypt(&m);
        let m2 = key.decrypt(&c);
        assert_eq!(m, m2, "encrypt message != decrypt message");
    }

    #[test]
    fn gnu_tls() {
        let key = gnu_tls_key();
        key_basics(&key);

        let mut rng = DefaultRand::default();
        let n = key.public_key().modules();
        for _ in 0..64 {
            let m = BigUintExt(n).gen_random(&mut rng);
            assert_eq!(key.decrypt(&key.public_key().encrypt(&m)), m);
        }
    }

    #[test]
    fn rsa_keygen_512() {
        let mut rng = DefaultRand::default();
        let key = KeyPair::generate_key(512, 10, &mut rng).unwrap();
        key_basics(&key);

        let (n, e) = (key.public_key().modules(), key.public_key().exponent());
        assert_eq!(e, &BigUint::from(65537u32));
        assert!(n.bits() >= 511 && n.bits() <= 512, "modulus bits {}", n.bits());

        for _ in 0..16 {
            let m = BigUintExt(n).gen_random(&mut rng);
            assert_eq!(key.decrypt(&key.public_key().encrypt(&m)), m);
        }
        assert!(key.decrypt(&BigUint::zero()).is_zero());
        assert!(key.decrypt(&BigUint::one()).is_one());
    }

    #[test]
    fn out_of_range_is_reduced() {
        let key = gnu_tls_key();
        let n = key.public_key().modules();
        let m = BigUint::from(12345u32);
        let c = key.public_key().encrypt(&m);
        assert_eq!(key.public_key().encrypt(&(&m + n)), c);
        assert_eq!(key.decrypt(&(&c + n)), m);
    }

    #[test]
    fn nonce_range() {
        let mut rng = SeededRand::new(0x5eed);
        let pk = PublicKey::new_uncheck(BigUint::from(7u32), BigUint::from(5u32));
        for _ in 0..256 {
            let nonce = pk.random_nonce(&mut rng).unwrap();
            assert!(nonce >= BigUint::one() && nonce < BigUint::from(7u32));
        }

        let pk = PublicKey::new_uncheck(BigUint::from(2u32), BigUint::from(3u32));
        assert!(pk.random_nonce(&mut rng).unwrap().is_one());

        let pk = PublicKey::new_uncheck(BigUint::zero(), BigUint::from(3u32));
        assert!(pk.random_nonce(&mut rng).is_err());
    }

    #[test]
    fn public_key_validate() {
        let e = BigUint::from(65537u32);
        assert!(PublicKey::new_uncheck(BigUint::zero(), e.clone()).is_valid().is_err());
        assert!(PublicKey::new_uncheck(BigUint::one(), e.clone()).is_valid().is_err());
        assert!(PublicKey::new_uncheck(BigUint::from(3233u32), BigUint::one())
            .is_valid()
            .is_err());
        assert!(PublicKey::new_uncheck(BigUint::from(3233u32), e).is_valid().is_ok());

        // 公钥指数没有上限
        let e = BigUint::from(u64::MAX);
        assert!(PublicKey::new_uncheck(BigUint::from(3233u32), e).is_valid().is_ok());
    }

    #[test]
    fn key_serialize() {
        let key = gnu_tls_key();
        let s = serde_json::to_string(&key).unwrap();
        let key2: KeyPair = serde_json::from_str(&s).unwrap();
        assert_eq!(key.public_key(), key2.public_key());
        assert_eq!(key.private_exponent(), key2.private_exponent());
    }
}
