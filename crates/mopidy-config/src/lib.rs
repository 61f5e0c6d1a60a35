//! Configuration for the MPD protocol server.
//!
//! Values are layered from the built-in defaults, an optional TOML file and
//! `--option section/key=value` overrides. The merged raw text is then run
//! through the typed schema in one pass, reporting every invalid key at once.

mod defaults;
mod error;
mod logging;
mod raw;
mod schema;
mod socket;
mod validators;
pub mod values;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

pub use defaults::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_HOSTNAME,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, default_config_path,
};
pub use error::{ConfigError, FieldError, RawConfigError, ValueError};
pub use logging::{LogFormat, LogFormatParseError, LogLevel};
pub use raw::RawConfig;
pub use socket::{SocketEndpoint, SocketPreparationError, UNIX_PREFIX};
pub use values::SecretString;

/// Command line flags that feed the configuration layers.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file to read on top of the defaults.
    #[arg(long = "config-path", value_name = "PATH")]
    pub config_path: Option<PathBuf>,
    /// Overrides one value, for example `mpd/port=6601`. May be repeated.
    #[arg(short = 'o', long = "option", value_name = "SECTION/KEY=VALUE")]
    pub options: Vec<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Base verbosity.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Explicit `tracing` filter; replaces `level` when set.
    pub filter: Option<String>,
}

/// `[mpd]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpdConfig {
    /// Whether the server should run at all.
    pub enabled: bool,
    /// Listening host, or `unix:/path` for a Unix domain socket.
    pub hostname: String,
    /// TCP port; ignored for Unix sockets.
    pub port: u16,
    /// Password required before most commands are accepted.
    pub password: Option<SecretString>,
    /// Cap on concurrently served connections.
    pub max_connections: u32,
    /// Idle read timeout per connection.
    pub connection_timeout: Duration,
}

impl MpdConfig {
    /// Endpoint derived from `hostname` and `port`.
    #[must_use]
    pub fn endpoint(&self) -> SocketEndpoint {
        SocketEndpoint::from_hostname(&self.hostname, self.port)
    }
}

/// Fully validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Logging setup.
    pub logging: LoggingConfig,
    /// MPD frontend setup.
    pub mpd: MpdConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: LogLevel::Info,
                format: LogFormat::Compact,
                filter: None,
            },
            mpd: MpdConfig {
                enabled: true,
                hostname: DEFAULT_HOSTNAME.to_owned(),
                port: DEFAULT_PORT,
                password: None,
                max_connections: DEFAULT_MAX_CONNECTIONS,
                connection_timeout: Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS),
            },
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and `args`.
    ///
    /// The file named by [`CONFIG_PATH_ENV`] is applied first, then
    /// `--config-path`, then each `--option`. When neither file is named the
    /// per-user file is read if it exists.
    pub fn load(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let env_path = env::var_os(CONFIG_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::load_layers(env_path.as_deref(), args)
    }

    /// Loads configuration with an explicit environment-supplied path.
    pub fn load_layers(env_path: Option<&Path>, args: &ConfigArgs) -> Result<Self, ConfigError> {
        let mut raw = RawConfig::parse(DEFAULT_CONFIG).map_err(|source| ConfigError::File {
            path: PathBuf::from("<defaults>"),
            source,
        })?;
        let mut errors = Vec::new();

        let mut files: Vec<PathBuf> = env_path
            .into_iter()
            .map(Path::to_path_buf)
            .chain(args.config_path.clone())
            .collect();
        if files.is_empty()
            && let Some(path) = default_config_path().filter(|path| path.is_file())
        {
            files.push(path);
        }

        for path in files {
            match read_file(&path) {
                Ok(layer) => raw.merge(layer),
                Err(error) => errors.push(error),
            }
        }

        for option in &args.options {
            match RawConfig::parse_override(option) {
                Ok((section, key, value)) => raw.set(&section, &key, value),
                Err(source) => errors.push(ConfigError::Override { source }),
            }
        }

        if let Some(error) = ConfigError::collect(errors) {
            return Err(error);
        }
        Self::from_raw(&raw)
    }

    /// Validates merged raw text against the schema.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        schema::from_raw(raw)
    }

    /// Converts back to raw text. `display` masks secrets.
    #[must_use]
    pub fn to_raw(&self, display: bool) -> RawConfig {
        schema::to_raw(self, display)
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml_string(&self, display: bool) -> Result<String, toml::ser::Error> {
        self.to_raw(display).to_toml_string()
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    RawConfig::parse(&source).map_err(|source| ConfigError::File {
        path: path.to_path_buf(),
        source,
    })
}
