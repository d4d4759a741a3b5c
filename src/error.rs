use cipher::CipherError;
use thiserror::Error;

/// 报文格式错误, 只丢弃当前报文, 会话继续
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Invalid data format: missing delimiter `{0}`")]
    MissingDelimiter(char),

    #[error("Invalid data format: empty {0}")]
    EmptyField(&'static str),

    #[error("Invalid decimal integer `{0}`")]
    InvalidInteger(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid acknowledgement `{0}`")]
    InvalidAck(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Malformed(#[from] WireError),

    /// 对当前连接是致命的, 对进程不是
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("payload of `{len}` bytes exceeds the limit of `{max}` bytes")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("{0}")]
    Cipher(#[from] CipherError),

    #[error("session is closed")]
    Closed,
}
