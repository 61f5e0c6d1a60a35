use std::io;
use std::thread;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use crate::transport::ShutdownTrigger;

use super::{PROCESS_TARGET, SHUTDOWN_POLL_INTERVAL};

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed, then leaves `trigger` set.
    ///
    /// Returns early when something else, such as a client `kill`, has
    /// already triggered shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be
    /// installed.
    fn wait(&self, trigger: &ShutdownTrigger) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl SystemShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self, trigger: &ShutdownTrigger) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        while !trigger.is_triggered() {
            if let Some(signal) = signals.pending().next() {
                info!(target: PROCESS_TARGET, signal, "shutdown signal received");
                trigger.trigger();
                break;
            }
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }
        handle.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn returns_once_triggered_elsewhere() {
        let trigger = ShutdownTrigger::new();
        let remote = trigger.clone();
        let killer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.trigger();
        });
        let started = Instant::now();
        SystemShutdownSignal::new()
            .wait(&trigger)
            .expect("signal handlers install");
        killer.join().expect("join trigger thread");
        assert!(trigger.is_triggered());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
