//! Unified error type.

use std::io;
use std::net::SocketAddr;

/// The error type returned by ackd's fallible operations.
///
/// Application-level failures (400, 404, 405, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding the listener or inspecting the socket.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listening socket could not be bound (port in use, permission
    /// denied, address not available). Never retried.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] io::Error),
}
