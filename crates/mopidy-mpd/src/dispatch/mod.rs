//! Request dispatch for the MPD line protocol.
//!
//! A connection sends newline-terminated requests and receives either
//! `Key: Value` lines ending in `OK`, or a single error line:
//!
//! ```text
//! play "0"
//! OK
//! playid "9"
//! ACK [50@0] {playid} Track with ID "9" not found
//! ```
//!
//! The pipeline is tokenizer, registry lookup, handler, formatter. The
//! command-list state machine in [`Dispatcher`] wraps it per session.

mod arguments;
mod dispatcher;
mod errors;
mod handler;
mod registry;
mod response;
mod session;
mod tokenizer;

pub use self::arguments::{Arguments, SongRange};
pub use self::dispatcher::{Dispatcher, LIST_BEGIN, LIST_END, LIST_OK_BEGIN, ServerSettings};
pub use self::errors::{AckError, AckKind, CommandError, ErrorClass, RegistryError, TokenizeError};
pub(crate) use self::handler::{ConnectionLimits, MpdConnectionHandler};
pub use self::registry::{Binder, Capability, CommandPattern, CommandRegistry, Handler, Resolution};
pub use self::response::{Payload, Response, format, write_response};
pub use self::session::{ListMode, Session};
pub use self::tokenizer::{Request, tokenize};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
