use crate::rsa::{KeyPair, PublicKey};
use crate::{BlockDecrypt, BlockEncrypt};
use num_bigint::BigUint;

/// Cipher Block Chaining Mode(CBC) over a big integer block function <br>
///
/// 初始向量IV必须是不可预测的, 同一个IV不能用于两条消息. 因此, 每条消息加密前需调用`self.set_iv`设置新的`IV`. <br>
pub struct CBC<E> {
    cipher: E,
    /// 初始化向量
    iv: BigUint,
}

// x mod 256
fn low_byte(x: &BigUint) -> u8 {
    x.iter_u64_digits().next().map_or(0, |d| d as u8)
}

impl<E> CBC<E> {
    pub fn new(cipher: E, iv: BigUint) -> Self {
        Self { cipher, iv }
    }

    pub fn set_iv(&mut self, iv: BigUint) {
        self.iv = iv;
    }

    pub fn get_cipher(&self) -> &E {
        &self.cipher
    }
}

impl<E: BlockEncrypt> CBC<E> {
    /// 每个明文字节输出一个密文分组, 输出顺序与输入一致
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<BigUint> {
        let (mut ciphertext, mut prev) = (Vec::with_capacity(plaintext.len()), low_byte(&self.iv));

        for &m in plaintext {
            let c = self.cipher.encrypt_block(&BigUint::from(m ^ prev));
            prev = low_byte(&c);
            ciphertext.push(c);
        }

        ciphertext
    }
}

impl<E: BlockDecrypt> CBC<E> {
    /// 解密结果只保留低8位, 被篡改的分组会得到错误的字节而不是报错
    pub fn decrypt(&self, ciphertext: &[BigUint]) -> Vec<u8> {
        let (mut plaintext, mut prev) = (Vec::with_capacity(ciphertext.len()), low_byte(&self.iv));

        for c in ciphertext {
            let x = self.cipher.decrypt_block(c);
            plaintext.push(low_byte(&x) ^ prev);
            prev = low_byte(c);
        }

        plaintext
    }
}

pub fn encrypt_message(plaintext: &[u8], pk: &PublicKey, iv: &BigUint) -> Vec<BigUint> {
    CBC::new(pk, iv.clone()).encrypt(plaintext)
}

pub fn decrypt_message(ciphertext: &[BigUint], key: &KeyPair, iv: &BigUint) -> Vec<u8> {
    CBC::new(key, iv.clone()).decrypt(ciphertext)
}
