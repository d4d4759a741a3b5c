use std::{error::Error, fmt::Display, time::Duration};

#[derive(Clone, Debug)]
pub enum CipherError {
    /// 模数位长过小
    InvalidBitsLen { min: usize, real: usize },

    InvalidPublicKey(String),

    /// 密钥生成时抽取的候选素数个数达到上限
    KeyGenExhausted { candidates: usize },

    /// 密钥生成超时
    KeyGenTimeout(Duration),

    Other(String),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBitsLen { min, real } => f.write_fmt(format_args!(
                "Invalid modulus bits length `{real}`, need at least `{min}` bits"
            )),
            Self::InvalidPublicKey(s) => f.write_str(s.as_str()),
            Self::KeyGenExhausted { candidates } => f.write_fmt(format_args!(
                "rsa: key generation gave up after drawing `{candidates}` prime candidates"
            )),
            Self::KeyGenTimeout(t) => {
                f.write_fmt(format_args!("rsa: key generation exceeded the deadline `{t:?}`"))
            }
            Self::Other(s) => f.write_str(s.as_str()),
        }
    }
}

impl Error for CipherError {}
