use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// Supported logging output formats.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    EnumString,
    Display,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

/// Verbosity accepted by the `logging/level` key.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumString,
    Display,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogLevel {
    /// Only unrecoverable failures.
    Critical,
    /// Errors.
    Error,
    /// Warnings and above.
    Warning,
    /// Informational messages and above.
    #[default]
    Info,
    /// Debug output and above.
    Debug,
    /// Everything the subscriber can see.
    Trace,
    /// Alias of `trace`.
    All,
}

impl LogLevel {
    /// Returns the `tracing` filter directive matching this level.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Critical | Self::Error => "error",
            Self::Warning => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace | Self::All => "trace",
        }
    }
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;
