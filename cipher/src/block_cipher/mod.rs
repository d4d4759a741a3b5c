use num_bigint::BigUint;

/// 以大整数为分组的加密函数, 输入输出都在`[0, n)`之中
pub trait BlockEncrypt {
    fn encrypt_block(&self, plaintext: &BigUint) -> BigUint;
}

pub trait BlockDecrypt {
    fn decrypt_block(&self, ciphertext: &BigUint) -> BigUint;
}

impl<T: BlockEncrypt + ?Sized> BlockEncrypt for &T {
    fn encrypt_block(&self, plaintext: &BigUint) -> BigUint {
        (**self).encrypt_block(plaintext)
    }
}

impl<T: BlockDecrypt + ?Sized> BlockDecrypt for &T {
    fn decrypt_block(&self, ciphertext: &BigUint) -> BigUint {
        (**self).decrypt_block(ciphertext)
    }
}
