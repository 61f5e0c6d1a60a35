use std::path::PathBuf;

use dirs::config_dir;

/// Default TCP port of the MPD protocol.
pub const DEFAULT_PORT: u16 = 6600;

/// Default listening address.
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Default cap on concurrently served connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default idle read timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 60;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "MOPIDY_CONFIG_PATH";

/// Built-in configuration layer. Every key the schema knows appears here.
pub const DEFAULT_CONFIG: &str = r#"
[logging]
level = "info"
format = "compact"
filter = ""

[mpd]
enabled = true
hostname = "127.0.0.1"
port = 6600
password = ""
max_connections = 20
connection_timeout = 60
"#;

/// Location of the per-user configuration file, when a config directory exists.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("mopidy").join("mopidy.toml"))
}
