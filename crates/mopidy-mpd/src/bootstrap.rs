//! Server bootstrap orchestration.

use std::sync::Arc;

use mopidy_config::{Config, ConfigArgs, ConfigError, SocketPreparationError};
use mopidy_core::Backend;
use thiserror::Error;

use crate::dispatch::{
    CommandRegistry, ConnectionLimits, Dispatcher, MpdConnectionHandler, RegistryError,
    ServerSettings,
};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, ShutdownTrigger, SocketListener};

/// Abstracts configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    ///
    /// # Errors
    ///
    /// Returns every layer or validation failure found.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that delegates to [`Config::load`] with command line arguments.
#[derive(Debug, Default, Clone)]
pub struct SystemConfigLoader {
    args: ConfigArgs,
}

impl SystemConfigLoader {
    #[must_use]
    pub fn new(args: ConfigArgs) -> Self {
        Self { args }
    }
}

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load(&self.args)
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare MPD socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The command table is inconsistent.
    #[error("failed to build command registry: {source}")]
    Registry {
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap: everything needed to listen.
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    backend: Arc<dyn Backend>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Server {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter used for lifecycle events.
    #[must_use]
    pub fn reporter(&self) -> &dyn HealthReporter {
        self.reporter.as_ref()
    }

    /// Binds the configured endpoint and starts accepting clients.
    ///
    /// The listener and every connection stop once `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the endpoint cannot be bound.
    pub fn listen(&self, shutdown: ShutdownTrigger) -> Result<ListenerHandle, ListenerError> {
        let endpoint = self.config.mpd.endpoint();
        let listener = SocketListener::bind(&endpoint)?;
        let limits = ConnectionLimits {
            max_connections: usize::try_from(self.config.mpd.max_connections)
                .unwrap_or(usize::MAX),
            timeout: self.config.mpd.connection_timeout,
        };
        let handler = MpdConnectionHandler::new(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.backend),
            limits,
            shutdown.clone(),
        );
        let handle = listener.start(Arc::new(handler), shutdown)?;
        self.reporter.listener_started(&endpoint);
        Ok(handle)
    }
}

/// Bootstraps the server using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first failing step; the reporter is
/// told about it before returning.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    backend: Arc<dyn Backend>,
) -> Result<Server, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader, backend) {
        Ok((config, dispatcher, backend, telemetry)) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Server {
                config,
                dispatcher,
                backend,
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

type Assembled = (Config, Arc<Dispatcher>, Arc<dyn Backend>, TelemetryHandle);

fn assemble(
    loader: &dyn ConfigLoader,
    backend: Arc<dyn Backend>,
) -> Result<Assembled, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .mpd
        .endpoint()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;
    let registry =
        CommandRegistry::standard().map_err(|source| BootstrapError::Registry { source })?;
    let settings = ServerSettings::new(config.mpd.password.clone());
    let dispatcher = Arc::new(Dispatcher::new(registry, settings));
    Ok((config, dispatcher, backend, telemetry))
}
