//! Transport adapters. Each one decodes envelopes off its channel, hands them
//! to the shared [`Dispatcher`](crate::handlers::Dispatcher) and writes any
//! response back on the same channel before reading the next message.

pub mod http;
pub mod stdio;
pub mod websocket;

use std::net::SocketAddr;

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Conditions that end a transport loop.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading from stdin: {0}")]
    Read(#[source] std::io::Error),
    #[error("error writing to stdout: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("http server failed: {0}")]
    Serve(#[source] std::io::Error),
}
