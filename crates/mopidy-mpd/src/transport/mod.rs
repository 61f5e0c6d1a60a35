//! Socket listener for the MPD endpoint.
//!
//! Binds the configured TCP or Unix socket and accepts connections on a
//! background thread, handing each stream to a [`ConnectionHandler`] on its
//! own thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
mod trigger;

pub use self::errors::ListenerError;
#[cfg(unix)]
pub use self::errors::StaleSocketStep;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub use self::listener::ListenerHandle;
pub(crate) use self::listener::SocketListener;
pub use self::trigger::ShutdownTrigger;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
