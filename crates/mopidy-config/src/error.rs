//! Error types raised while reading and validating configuration.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn one raw config string into a typed value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// A required value was empty.
    #[error("must be set.")]
    Required,
    /// The value is not one of the permitted choices.
    #[error("must be one of {choices}, not {value}.")]
    Choice { value: String, choices: String },
    /// The value is below the configured minimum.
    #[error("{value} must be larger than {minimum}.")]
    Minimum { value: String, minimum: String },
    /// The value is above the configured maximum.
    #[error("{value} must be smaller than {maximum}.")]
    Maximum { value: String, maximum: String },
    /// The value does not parse as an integer.
    #[error("invalid value for integer: {0:?}")]
    Integer(String),
    /// The value does not parse as a float.
    #[error("invalid value for float: {0:?}")]
    Float(String),
    /// The value is not one of the recognised boolean spellings.
    #[error("invalid value for boolean: {0:?}")]
    Boolean(String),
    /// A pair value lacks its separator.
    #[error("config value must include {separator:?} separator: {value}")]
    MissingSeparator { separator: String, value: String },
    /// The hostname does not resolve.
    #[error("must be a resolveable hostname or valid IP")]
    Hostname,
    /// A path could not be expanded.
    #[error("unable to expand path {0:?}")]
    Path(String),
}

/// Validation failure for a single `section/key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Section name, for example `mpd`.
    pub section: String,
    /// Key name inside the section.
    pub key: String,
    /// Human readable reason.
    pub message: String,
}

impl FieldError {
    /// Builds a field error from any displayable reason.
    #[must_use]
    pub fn new(section: &str, key: &str, message: impl fmt::Display) -> Self {
        Self {
            section: section.to_owned(),
            key: key.to_owned(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{} {}", self.section, self.key, self.message)
    }
}

/// Errors produced while turning TOML text into raw config strings.
#[derive(Debug, Error)]
pub enum RawConfigError {
    /// The document is not valid TOML.
    #[error(transparent)]
    Syntax(#[from] toml::de::Error),
    /// A top-level entry is not a section table.
    #[error("top-level key '{section}' must be a [section] table")]
    NotATable { section: String },
    /// A value inside a section has an unsupported shape.
    #[error("{section}/{key} must be a string, number, boolean or array")]
    UnsupportedValue { section: String, key: String },
    /// A command line override is not of the form `section/key=value`.
    #[error("invalid override '{0}': expected section/key=value")]
    Override(String),
}

/// Errors surfaced by [`crate::Config`] loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A config file could not be parsed into raw values.
    #[error("failed to parse config file '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: RawConfigError,
    },
    /// A command line override was malformed.
    #[error("invalid command line option: {source}")]
    Override {
        #[source]
        source: RawConfigError,
    },
    /// One or more values failed schema validation.
    #[error("invalid configuration: {}", render_fields(.errors))]
    Invalid { errors: Vec<FieldError> },
    /// Several independent sources failed.
    #[error("multiple configuration errors: {}", render_errors(.0))]
    Aggregate(Vec<ConfigError>),
}

impl ConfigError {
    /// Collapses a list of errors, returning `None` when it is empty.
    #[must_use]
    pub fn collect(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(errors)),
        }
    }
}

fn render_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
