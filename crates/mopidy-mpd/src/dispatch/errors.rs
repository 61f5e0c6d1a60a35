//! Error types for request tokenizing, registration and command execution.
//!
//! Every failure a client can observe ends up as an [`AckError`], which the
//! formatter renders as a single `ACK [code@index] {command} message` line.
//! Handlers only ever produce a [`CommandError`]; the dispatcher attaches the
//! list index, command name and literal request text.

use std::fmt;

use mopidy_core::BackendError;
use thiserror::Error;
use tracing::error;

use super::DISPATCH_TARGET;

/// Protocol error kinds and their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKind {
    /// Recognised command without an implementation.
    NotImplemented,
    /// Command list misuse.
    NotList,
    /// Malformed request or bad argument.
    Argument,
    /// Wrong password.
    Password,
    /// Not authorised for the command.
    Permission,
    /// No command by that name.
    UnknownCommand,
    /// The addressed entity does not exist.
    NoExist,
    /// Server or backend failure.
    System,
}

impl AckKind {
    /// Numeric code written between the brackets.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::NotImplemented => 0,
            Self::NotList => 1,
            Self::Argument => 2,
            Self::Password => 3,
            Self::Permission => 4,
            Self::UnknownCommand => 5,
            Self::NoExist => 50,
            Self::System => 52,
        }
    }

    /// Coarse class used for logging decisions.
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::NotImplemented => ErrorClass::NotImplemented,
            Self::NotList | Self::Argument => ErrorClass::MalformedRequest,
            Self::UnknownCommand => ErrorClass::UnknownCommand,
            Self::Password | Self::Permission | Self::NoExist => ErrorClass::DomainError,
            Self::System => ErrorClass::InternalError,
        }
    }
}

/// Taxonomy the ACK kinds fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request could not be tokenized or matched.
    MalformedRequest,
    /// No handler is registered for the command name.
    UnknownCommand,
    /// The command is recognised but unsupported.
    NotImplemented,
    /// The backend rejected the operation.
    DomainError,
    /// Something failed inside the server.
    InternalError,
}

/// Failure returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandError {
    kind: AckKind,
    message: String,
}

impl CommandError {
    /// Builds an error of `kind`.
    pub fn new(kind: AckKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The command is recognised but unsupported.
    #[must_use]
    pub fn not_implemented() -> Self {
        Self::new(AckKind::NotImplemented, "Not implemented")
    }

    /// An argument failed to parse.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(AckKind::Argument, message)
    }

    /// The addressed entity does not exist.
    pub fn no_exist(message: impl Into<String>) -> Self {
        Self::new(AckKind::NoExist, message)
    }

    /// The session may not run the command.
    #[must_use]
    pub fn permission(command: &str) -> Self {
        Self::new(
            AckKind::Permission,
            format!("you don't have permission for \"{command}\""),
        )
    }

    /// Password mismatch.
    #[must_use]
    pub fn incorrect_password() -> Self {
        Self::new(AckKind::Password, "incorrect password")
    }

    /// Opaque server failure; details belong in the log, not on the wire.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(AckKind::System, "internal error")
    }

    /// Error kind.
    #[must_use]
    pub fn kind(&self) -> AckKind {
        self.kind
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<BackendError> for CommandError {
    fn from(source: BackendError) -> Self {
        match source {
            BackendError::PositionOutOfBounds { .. }
            | BackendError::TrackNotFound { .. }
            | BackendError::PlaylistNotFound { .. } => Self::no_exist(source.to_string()),
            BackendError::Unavailable { .. } => Self::new(AckKind::System, source.to_string()),
            BackendError::Internal { ref message } => {
                error!(
                    target: DISPATCH_TARGET,
                    detail = %message,
                    "backend failure"
                );
                Self::internal()
            }
        }
    }
}

/// A fully addressed protocol error, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckError {
    kind: AckKind,
    message: String,
    index: usize,
    command: String,
    request: String,
}

impl AckError {
    /// Builds an error for `command` at list `index` (0 outside a list).
    pub fn new(
        kind: AckKind,
        index: usize,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            index,
            command: command.into(),
            request: String::new(),
        }
    }

    /// Attaches a handler failure to its position and command.
    #[must_use]
    pub fn from_command(error: CommandError, index: usize, command: &str) -> Self {
        Self::new(error.kind, index, command, error.message)
    }

    /// Records the literal request text that failed.
    #[must_use]
    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = request.into();
        self
    }

    /// Error kind.
    #[must_use]
    pub fn kind(&self) -> AckKind {
        self.kind
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-based position inside a command list, 0 otherwise.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Command name shown between the braces.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The request line that produced the error.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }
}

impl fmt::Display for AckError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "ACK [{}@{}] {{{}}} {}",
            self.kind.code(),
            self.index,
            self.command,
            self.message
        )
    }
}

impl std::error::Error for AckError {}

/// Errors raised while splitting a request line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A double quote was opened but never closed.
    #[error("unterminated quoted argument")]
    UnterminatedQuote {
        /// Command name, empty when the name itself was quoted.
        command: String,
    },
}

impl TokenizeError {
    /// Command name the error should be reported against.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::UnterminatedQuote { command } => command,
        }
    }
}

/// Errors raised while building a [`CommandRegistry`](super::CommandRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The pattern text is already bound to a handler.
    #[error("pattern '{pattern}' is already registered")]
    DuplicatePattern {
        /// Normalised pattern text.
        pattern: String,
    },
    /// The pattern has no command name.
    #[error("pattern must start with a command name")]
    EmptyPattern,
    /// A placeholder token is malformed.
    #[error("pattern '{pattern}' has an invalid placeholder '{token}'")]
    InvalidPlaceholder {
        /// Offending pattern.
        pattern: String,
        /// Offending token.
        token: String,
    },
    /// A required placeholder follows an optional or variadic one.
    #[error("pattern '{pattern}' places '{token}' after an optional argument")]
    MisplacedOptional {
        /// Offending pattern.
        pattern: String,
        /// Offending token.
        token: String,
    },
}
