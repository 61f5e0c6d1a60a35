//! Process lifecycle: command line, launch sequencing and shutdown.

use std::time::Duration;

mod cli;
mod errors;
mod launch;
mod shutdown;

pub use cli::Cli;
pub use errors::LaunchError;
pub use launch::run_server;
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);
