//! Two-party request/response session.
//!
//! The key holder (server) publishes `e|n` once per connection, the peer (client)
//! sends `encrypted_nonce|c1,c2,...,ck` per message and gets back
//! `Message received: <plaintext>\r\n`. One logical message is expected to fit in
//! a single read of at most `max_payload` bytes.

mod transport;
pub use transport::Transport;

pub mod wire;

mod server;
pub use server::{Server, ServerSession};

mod client;
pub use client::ClientSession;

/// 64KiB, the receive buffer size of the key holder
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitConnection,
    KeySent,
    AwaitMessage,
    MessageProcessed,
    Closed,
}
