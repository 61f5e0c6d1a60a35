//! Collaborators shared by the behavioural suites and unit tests.

use std::sync::Mutex;

use mopidy_config::{Config, ConfigArgs, ConfigError, SocketEndpoint};

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::health::HealthReporter;

/// Reporter that remembers event names in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingReporter {
    fn record(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.events.lock().expect("events lock").clone()
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record("bootstrap_starting");
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record("bootstrap_succeeded");
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.record("bootstrap_failed");
    }

    fn listener_started(&self, _endpoint: &SocketEndpoint) {
        self.record("listener_started");
    }

    fn shutdown_requested(&self) {
        self.record("shutdown_requested");
    }
}

/// Loader whose command line override never validates.
#[derive(Debug, Clone)]
pub(crate) struct FailingLoader {
    pub(crate) option: String,
}

impl ConfigLoader for FailingLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let args = ConfigArgs {
            config_path: None,
            options: vec![self.option.clone()],
        };
        Config::load_layers(None, &args)
    }
}

/// Defaults bound to an ephemeral loopback port.
pub(crate) fn ephemeral_config() -> Config {
    let mut config = Config::default();
    config.mpd.port = 0;
    config
}
