use crate::error::{SessionError, WireError};
use crate::session::wire::{self, EncryptedRequest};
use crate::session::{SessionState, Transport};
use cipher::cipher_mode::decrypt_message;
use cipher::rsa::KeyPair;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;

/// Key holder side of one connection. The key pair is shared by every session
/// and never mutated, the session itself owns no key material.
pub struct ServerSession<'k, T> {
    transport: T,
    key: &'k KeyPair,
    max_payload: usize,
    state: SessionState,
    processed: usize,
}

impl<'k, T: Transport> ServerSession<'k, T> {
    pub fn new(transport: T, key: &'k KeyPair, max_payload: usize) -> Self {
        Self {
            transport,
            key,
            max_payload,
            state: SessionState::AwaitConnection,
            processed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 已经确认的消息数
    pub fn processed(&self) -> usize {
        self.processed
    }

    fn close_on_err<R>(&mut self, res: io::Result<R>) -> Result<R, SessionError> {
        res.map_err(|e| {
            self.state = SessionState::Closed;
            SessionError::from(e)
        })
    }

    pub fn send_public_key(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitConnection {
            return Err(SessionError::Closed);
        }

        let pk = wire::encode_public_key(self.key.public_key());
        let res = self.transport.send(pk.as_bytes());
        self.close_on_err(res)?;
        self.state = SessionState::KeySent;
        log::debug!("public key sent: {pk}");

        self.state = SessionState::AwaitMessage;
        Ok(())
    }

    /// 用私钥恢复IV, 再按链接模式解密全部分组
    pub fn decrypt_request(key: &KeyPair, data: &str) -> Result<Vec<u8>, WireError> {
        let req = EncryptedRequest::decode(data)?;
        log::debug!(
            "encrypted nonce: {}, {} ciphertext blocks",
            req.nonce,
            req.blocks.len()
        );

        let iv = key.decrypt(&req.nonce);
        log::trace!("decrypted IV: {iv}");

        Ok(decrypt_message(req.blocks.as_slice(), key, &iv))
    }

    /// Wait for one request and acknowledge it.
    ///
    /// Returns `Ok(false)` once the peer has closed the connection. A malformed
    /// request is logged and dropped without reply, the session keeps waiting.
    pub fn serve_one(&mut self) -> Result<bool, SessionError> {
        if self.state != SessionState::AwaitMessage {
            return Err(SessionError::Closed);
        }

        let res = self.transport.receive(self.max_payload);
        let data = self.close_on_err(res)?;
        if data.is_empty() {
            log::info!("client disconnected");
            self.state = SessionState::Closed;
            return Ok(false);
        }

        let data = String::from_utf8_lossy(data.as_slice());
        log::debug!("received data: {data}");

        match Self::decrypt_request(self.key, &data) {
            Ok(plaintext) => {
                let plaintext = String::from_utf8_lossy(plaintext.as_slice());
                log::info!("decrypted message: {plaintext}");
                self.state = SessionState::MessageProcessed;

                let ack = wire::encode_ack(&plaintext);
                let res = self.transport.send(ack.as_bytes());
                self.close_on_err(res)?;
                self.processed += 1;
            }
            Err(e) => {
                log::warn!("{e}");
            }
        }

        self.state = SessionState::AwaitMessage;
        Ok(true)
    }

    /// 发送公钥, 然后处理消息直到对端关闭或者传输出错, 返回已确认的消息数
    pub fn run(&mut self) -> Result<usize, SessionError> {
        let res = self.run_inner();
        self.state = SessionState::Closed;
        if let Err(e) = self.transport.shutdown() {
            log::debug!("shutdown transport: {e}");
        }
        res
    }

    fn run_inner(&mut self) -> Result<usize, SessionError> {
        self.send_public_key()?;
        while self.serve_one()? {}
        Ok(self.processed)
    }
}

/// Sequential accept loop, one connection is served to completion before the next.
pub struct Server {
    listener: TcpListener,
    key: Arc<KeyPair>,
    max_payload: usize,
}

impl Server {
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        key: Arc<KeyPair>,
        max_payload: usize,
    ) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            key,
            max_payload,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 接受一个连接并处理到连接结束
    pub fn accept_one(&self) -> Result<usize, SessionError> {
        let (stream, peer) = self.listener.accept()?;
        log::info!("client connected: {peer}");

        let mut session = ServerSession::new(stream, self.key.as_ref(), self.max_payload);
        session.run()
    }

    /// 连接上的错误只记录日志, 不会结束服务
    pub fn serve(&self) {
        loop {
            match self.accept_one() {
                Ok(n) => log::info!("connection closed after {n} messages"),
                Err(e) => log::error!("{e}"),
            }
        }
    }
}
