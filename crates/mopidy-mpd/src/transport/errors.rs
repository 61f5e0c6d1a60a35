//! Failures while binding or serving the MPD socket.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// What the listener was doing to a leftover Unix socket when it failed.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleSocketStep {
    /// Reading the file's metadata.
    Inspect,
    /// Probing for a live server.
    Probe,
    /// Deleting the dead socket file.
    Remove,
}

#[cfg(unix)]
impl std::fmt::Display for StaleSocketStep {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Inspect => "inspect",
            Self::Probe => "probe",
            Self::Remove => "remove",
        })
    }
}

/// Errors raised by [`SocketListener`](super::SocketListener).
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured hostname did not resolve.
    #[error("cannot resolve MPD host {host}:{port}: {source}")]
    Resolve {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The hostname resolved to nothing.
    #[error("MPD host {host}:{port} resolved to no addresses")]
    ResolveEmpty {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
    /// The TCP port could not be bound.
    #[error("cannot bind MPD port {addr}: {source}")]
    BindTcp {
        /// Resolved address.
        addr: SocketAddr,
        /// Bind failure.
        #[source]
        source: io::Error,
    },
    /// The listener could not be made non-blocking.
    #[error("cannot poll the MPD listener: {source}")]
    NonBlocking {
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The platform has no Unix domain sockets.
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported on this platform: {endpoint}")]
    UnsupportedUnix {
        /// Configured endpoint.
        endpoint: String,
    },
    /// The Unix socket could not be bound.
    #[cfg(unix)]
    #[error("cannot bind MPD socket {path}: {source}")]
    BindUnix {
        /// Socket path.
        path: String,
        /// Bind failure.
        #[source]
        source: io::Error,
    },
    /// Another process answers on the socket path.
    #[cfg(unix)]
    #[error("another server is listening on {path}")]
    UnixInUse {
        /// Socket path.
        path: String,
    },
    /// Something other than a socket occupies the path.
    #[cfg(unix)]
    #[error("{path} exists and is not a socket")]
    UnixNotSocket {
        /// Socket path.
        path: String,
    },
    /// A leftover socket file could not be dealt with.
    #[cfg(unix)]
    #[error("cannot {step} leftover socket {path}: {source}")]
    StaleSocket {
        /// Socket path.
        path: String,
        /// Step that failed.
        step: StaleSocketStep,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("MPD listener thread panicked")]
    ThreadPanic,
}
