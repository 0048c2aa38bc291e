//! WebSocket transport: URL parsing and the connect/read/write client.

mod client;
mod url;

pub use client::{WsClient, WsConfig, WsIncoming};
pub use url::{parse_ws_url, WsUrl};

use std::fmt;

/// Connection and IO error kinds, one per phase of the client state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsErrorKind {
    InvalidUrl,
    ResolveFailed,
    ConnectFailed,
    SslHandshakeFailed,
    WsHandshakeFailed,
    ReadFailed,
    WriteFailed,
}

impl WsErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WsErrorKind::InvalidUrl => "invalid_url",
            WsErrorKind::ResolveFailed => "resolve_failed",
            WsErrorKind::ConnectFailed => "connect_failed",
            WsErrorKind::SslHandshakeFailed => "ssl_handshake_failed",
            WsErrorKind::WsHandshakeFailed => "ws_handshake_failed",
            WsErrorKind::ReadFailed => "read_failed",
            WsErrorKind::WriteFailed => "write_failed",
        }
    }
}

impl fmt::Display for WsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A WebSocket failure paired with a human-readable detail.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct WsError {
    pub kind: WsErrorKind,
    pub detail: String,
}

impl WsError {
    pub fn new(kind: WsErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}
