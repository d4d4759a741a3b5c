mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand, SeededRand};

pub mod block_cipher;
pub use block_cipher::{BlockDecrypt, BlockEncrypt};

pub mod cipher_mode;
pub use cipher_mode::CBC;

pub mod rsa;
