//! Textual wire format, decimal integers joined by delimiters.
//!
//! | message | format |
//! |---|---|
//! | public key | `<e>\|<n>` |
//! | encrypted request | `<encrypted_nonce>\|<c1>,<c2>,...,<ck>` |
//! | acknowledgement | `Message received: <plaintext>\r\n` |

use crate::error::WireError;
use cipher::rsa::PublicKey;
use num_bigint::BigUint;
use std::fmt::Write;

pub const KEY_DELIMITER: char = '|';
pub const BLOCK_DELIMITER: char = ',';
pub const ACK_PREFIX: &str = "Message received: ";
pub const ACK_SUFFIX: &str = "\r\n";

// 只接受十进制数字, 允许首尾空白
fn parse_integer(s: &str, field: &'static str) -> Result<BigUint, WireError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(WireError::EmptyField(field));
    }

    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WireError::InvalidInteger(s.to_string()));
    }

    BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| WireError::InvalidInteger(s.to_string()))
}

fn split_key(data: &str) -> Result<(&str, &str), WireError> {
    data.split_once(KEY_DELIMITER)
        .ok_or(WireError::MissingDelimiter(KEY_DELIMITER))
}

pub fn encode_public_key(pk: &PublicKey) -> String {
    format!("{}{KEY_DELIMITER}{}", pk.exponent(), pk.modules())
}

/// 解析并检查对端的公钥, 不合法的公钥对本次连接是致命的
pub fn decode_public_key(data: &str) -> Result<PublicKey, WireError> {
    let (e, n) = split_key(data)?;
    let (e, n) = (
        parse_integer(e, "public exponent")?,
        parse_integer(n, "modulus")?,
    );

    let pk = PublicKey::new_uncheck(n, e);
    pk.is_valid()
        .map_err(|e| WireError::InvalidPublicKey(e.to_string()))?;
    Ok(pk)
}

/// Encrypted nonce plus the chained cipher blocks, one block per plaintext byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedRequest {
    pub nonce: BigUint,
    pub blocks: Vec<BigUint>,
}

impl EncryptedRequest {
    pub fn encode(&self) -> String {
        let mut s = String::with_capacity(160 * (self.blocks.len() + 1));
        let _ = write!(s, "{}{KEY_DELIMITER}", self.nonce);
        for (i, c) in self.blocks.iter().enumerate() {
            if i != 0 {
                s.push(BLOCK_DELIMITER);
            }
            let _ = write!(s, "{c}");
        }
        s
    }

    /// 空的分组项会被跳过, 因此`<nonce>|`表示空消息
    pub fn decode(data: &str) -> Result<Self, WireError> {
        let (nonce, blocks) = split_key(data)?;
        let nonce = parse_integer(nonce, "nonce")?;
        let blocks = blocks
            .split(BLOCK_DELIMITER)
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| parse_integer(b, "cipher block"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { nonce, blocks })
    }
}

pub fn encode_ack(plaintext: &str) -> String {
    format!("{ACK_PREFIX}{plaintext}{ACK_SUFFIX}")
}

pub fn decode_ack(data: &str) -> Result<&str, WireError> {
    data.strip_suffix(ACK_SUFFIX)
        .unwrap_or(data)
        .strip_prefix(ACK_PREFIX)
        .ok_or_else(|| WireError::InvalidAck(data.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode_ack, decode_public_key, encode_ack, encode_public_key, EncryptedRequest};
    use crate::error::WireError;
    use cipher::rsa::PublicKey;
    use num_bigint::BigUint;

    #[test]
    fn public_key() {
        let pk = PublicKey::new_uncheck(BigUint::from(3233u32), BigUint::from(17u32));
        let s = encode_public_key(&pk);
        assert_eq!(s, "17|3233");
        assert_eq!(decode_public_key(&s).unwrap(), pk);
        assert_eq!(decode_public_key(" 17 | 3233\r\n").unwrap(), pk);

        assert_eq!(
            decode_public_key("garbage-no-delimiter"),
            Err(WireError::MissingDelimiter('|'))
        );
        assert_eq!(
            decode_public_key("|3233"),
            Err(WireError::EmptyField("public exponent"))
        );
        assert_eq!(decode_public_key("17|"), Err(WireError::EmptyField("modulus")));
        assert!(matches!(
            decode_public_key("17|0"),
            Err(WireError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            decode_public_key("0|3233"),
            Err(WireError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            decode_public_key("17|-3233"),
            Err(WireError::InvalidInteger(_))
        ));
    }

    #[test]
    fn request_format() {
        let req = EncryptedRequest {
            nonce: BigUint::from(7u32),
            blocks: vec![
                BigUint::from(1u32),
                BigUint::from(22u32),
                BigUint::from(333u32),
            ],
        };
        assert_eq!(req.encode(), "7|1,22,333");
        assert_eq!(EncryptedRequest::decode("7|1,22,333").unwrap(), req);
        assert_eq!(EncryptedRequest::decode("7|1,,22,333,\r\n").unwrap(), req);

        let empty = EncryptedRequest {
            nonce: BigUint::from(7u32),
            blocks: vec![],
        };
        assert_eq!(empty.encode(), "7|");
        assert_eq!(EncryptedRequest::decode("7|").unwrap(), empty);
    }

    #[test]
    fn malformed_request() {
        assert_eq!(
            EncryptedRequest::decode("garbage-no-delimiter"),
            Err(WireError::MissingDelimiter('|'))
        );
        assert_eq!(
            EncryptedRequest::decode("|1,2"),
            Err(WireError::EmptyField("nonce"))
        );
        assert_eq!(
            EncryptedRequest::decode("12|1,x2"),
            Err(WireError::InvalidInteger("x2".to_string()))
        );
        assert_eq!(
            EncryptedRequest::decode("+12|1"),
            Err(WireError::InvalidInteger("+12".to_string()))
        );
        assert!(EncryptedRequest::decode("1_000|1").is_err());
    }

    #[test]
    fn ack() {
        let s = encode_ack("Hello World!");
        assert_eq!(s, "Message received: Hello World!\r\n");
        assert_eq!(decode_ack(&s), Ok("Hello World!"));
        assert_eq!(decode_ack("Message received: "), Ok(""));
        assert!(decode_ack("Hello World!\r\n").is_err());
    }
}
