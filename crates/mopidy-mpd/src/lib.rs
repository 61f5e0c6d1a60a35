//! MPD protocol server for the Mopidy backend façade.
//!
//! Clients speak the Music Player Daemon line protocol over TCP or a Unix
//! socket. Each request line is tokenized, matched against the command
//! registry, run against a [`mopidy_core::Backend`] and answered with
//! `Key: Value` lines and `OK`, or a single `ACK` error line. Command lists
//! are buffered per connection and replayed when they end.
//!
//! Startup follows a fixed sequence. Configuration is loaded from layered
//! files and overrides via [`mopidy_config`]. Telemetry is installed and the
//! socket filesystem prepared. Then the listener starts and the process waits
//! for a termination signal or a client `kill`. Health reporting hooks emit
//! structured events at each stage.

mod bootstrap;
pub mod commands;
pub mod dispatch;
mod health;
mod process;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Server, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    Cli, LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ListenerError, ListenerHandle, ShutdownTrigger};

#[cfg(test)]
mod tests;
