//! Command line surface of the server binary.

use clap::Parser;
use mopidy_config::ConfigArgs;

/// MPD protocol server backed by an in-memory music library.
#[derive(Parser, Debug, Default)]
#[command(name = "mopidy-mpd", version)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Prints the effective configuration with secrets masked, then exits.
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layers_and_flags() {
        let cli = Cli::try_parse_from([
            "mopidy-mpd",
            "--config-path",
            "/etc/mopidy.toml",
            "-o",
            "mpd/port=6601",
            "--option",
            "logging/level=debug",
            "--show-config",
        ])
        .expect("valid arguments");
        assert!(cli.show_config);
        assert_eq!(
            cli.config.config_path.as_deref(),
            Some(std::path::Path::new("/etc/mopidy.toml"))
        );
        assert_eq!(cli.config.options, ["mpd/port=6601", "logging/level=debug"]);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["mopidy-mpd", "--daemonize"]).is_err());
    }
}
