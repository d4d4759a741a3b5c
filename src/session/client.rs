use crate::error::SessionError;
use crate::session::wire::{self, EncryptedRequest};
use crate::session::{SessionState, Transport};
use cipher::cipher_mode::CBC;
use cipher::rsa::PublicKey;
use cipher::{DefaultRand, Rand};
use num_bigint::BigUint;
use std::io;

/// Peer side of one connection, owns its random source so concurrent sessions
/// never share nonce state.
pub struct ClientSession<T, R = DefaultRand> {
    transport: T,
    cbc: CBC<PublicKey>,
    rng: R,
    max_payload: usize,
    state: SessionState,
}

impl<T: Transport> ClientSession<T, DefaultRand> {
    /// 接收并检查对端公钥
    pub fn connect(transport: T, max_payload: usize) -> Result<Self, SessionError> {
        Self::connect_with_rng(transport, max_payload, DefaultRand::default())
    }
}

impl<T: Transport, R: Rand> ClientSession<T, R> {
    pub fn connect_with_rng(
        mut transport: T,
        max_payload: usize,
        rng: R,
    ) -> Result<Self, SessionError> {
        let data = transport.receive(max_payload)?;
        if data.is_empty() {
            return Err(SessionError::PeerClosed);
        }

        let pk = wire::decode_public_key(&String::from_utf8_lossy(data.as_slice()))?;
        log::info!(
            "received public key: e = {}, n = {}",
            pk.exponent(),
            pk.modules()
        );

        Ok(Self {
            transport,
            cbc: CBC::new(pk, BigUint::default()),
            rng,
            max_payload,
            state: SessionState::AwaitMessage,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        self.cbc.get_cipher()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn close_on_err<V>(&mut self, res: io::Result<V>) -> Result<V, SessionError> {
        res.map_err(|e| {
            self.state = SessionState::Closed;
            SessionError::from(e)
        })
    }

    /// 每条消息使用新的nonce作为IV, nonce用对端公钥加密后随密文一起发送
    pub fn encrypt_request(&mut self, plaintext: &[u8]) -> Result<EncryptedRequest, SessionError> {
        let nonce = self.cbc.get_cipher().random_nonce(&mut self.rng)?;
        let encrypted_nonce = self.public_key().encrypt(&nonce);
        self.cbc.set_iv(nonce);

        Ok(EncryptedRequest {
            nonce: encrypted_nonce,
            blocks: self.cbc.encrypt(plaintext),
        })
    }

    /// Send one message and wait for its acknowledgement, returns the ack text
    /// exactly as the key holder sent it.
    pub fn send_message(&mut self, msg: &str) -> Result<String, SessionError> {
        if self.state != SessionState::AwaitMessage {
            return Err(SessionError::Closed);
        }

        let data = self.encrypt_request(msg.as_bytes())?.encode();
        if data.len() > self.max_payload {
            return Err(SessionError::PayloadTooLarge {
                len: data.len(),
                max: self.max_payload,
            });
        }

        let res = self.transport.send(data.as_bytes());
        self.close_on_err(res)?;
        log::debug!("message sent, {} bytes", data.len());

        let res = self.transport.receive(self.max_payload);
        let resp = self.close_on_err(res)?;
        if resp.is_empty() {
            self.state = SessionState::Closed;
            return Err(SessionError::PeerClosed);
        }

        let resp = String::from_utf8_lossy(resp.as_slice()).into_owned();
        wire::decode_ack(&resp)?;
        Ok(resp)
    }

    /// 结束会话并关闭连接, 对端随后读到EOF
    pub fn close(mut self) {
        self.state = SessionState::Closed;
        if let Err(e) = self.transport.shutdown() {
            log::warn!("shutdown transport failed: {e}");
        }
    }
}
