//! Request dispatch and the command-list transaction engine.
//!
//! Outside a list each line is tokenized, resolved against the registry and
//! run straight away. Between `command_list_begin` (or
//! `command_list_ok_begin`) and `command_list_end` raw lines are buffered and
//! then replayed in order; the first failure stops the replay and is reported
//! with its one-based position in the buffer.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use mopidy_config::SecretString;
use mopidy_core::{Backend, BackendError};
use tracing::{debug, error};

use super::DISPATCH_TARGET;
use super::errors::{AckError, AckKind, CommandError};
use super::registry::{CommandPattern, CommandRegistry, Resolution};
use super::response::{Payload, Response};
use super::session::{ListMode, Session};
use super::tokenizer::{Request, tokenize};
use crate::commands::CommandContext;

/// Starts a plain command list.
pub const LIST_BEGIN: &str = "command_list_begin";
/// Starts a command list acknowledging each command.
pub const LIST_OK_BEGIN: &str = "command_list_ok_begin";
/// Ends and replays a command list.
pub const LIST_END: &str = "command_list_end";

/// Server-wide values handlers may read.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    password: Option<SecretString>,
    started_at: Instant,
}

impl ServerSettings {
    /// Settings with an optional connection password.
    #[must_use]
    pub fn new(password: Option<SecretString>) -> Self {
        Self {
            password,
            started_at: Instant::now(),
        }
    }

    /// Configured password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Seconds since the server started.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Routes request lines to handlers.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    settings: ServerSettings,
}

impl Dispatcher {
    /// Builds a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: CommandRegistry, settings: ServerSettings) -> Self {
        Self { registry, settings }
    }

    /// The registry requests are resolved against.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Server-wide settings.
    #[must_use]
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// A fresh session for a new connection.
    #[must_use]
    pub fn new_session(&self) -> Session {
        Session::new(self.settings.password.is_some())
    }

    /// Handles one raw request line.
    pub fn dispatch(&self, line: &str, session: &mut Session, backend: &dyn Backend) -> Response {
        match session.list_mode() {
            ListMode::None => self.dispatch_single(line, session, backend),
            ListMode::List | ListMode::ListOk => self.dispatch_buffered(line, session, backend),
        }
    }

    fn dispatch_single(&self, line: &str, session: &mut Session, backend: &dyn Backend) -> Response {
        let request = match tokenize(line) {
            Ok(request) => request,
            Err(error) => {
                let command = error.command().to_owned();
                return ack(AckError::new(AckKind::Argument, 0, command, error.to_string())
                    .with_request(line));
            }
        };
        match request.name() {
            "" if request.is_empty() => Response::ok(),
            LIST_BEGIN => {
                session.begin_list(ListMode::List);
                Response::Suspended
            }
            LIST_OK_BEGIN => {
                session.begin_list(ListMode::ListOk);
                Response::Suspended
            }
            LIST_END => ack(
                AckError::new(AckKind::NotList, 0, LIST_END, "not in command list")
                    .with_request(line),
            ),
            _ => match self.execute(&request, line, 0, session, backend) {
                Ok(payload) => Response::Ok(payload),
                Err(error) => ack(error),
            },
        }
    }

    fn dispatch_buffered(
        &self,
        line: &str,
        session: &mut Session,
        backend: &dyn Backend,
    ) -> Response {
        let name = tokenize(line)
            .map(|request| request.name().to_owned())
            .unwrap_or_default();
        match name.as_str() {
            LIST_END => self.replay(session, backend),
            LIST_BEGIN | LIST_OK_BEGIN => {
                let (_, discarded) = session.end_list();
                debug!(
                    target: DISPATCH_TARGET,
                    discarded = discarded.len(),
                    "nested command list rejected"
                );
                ack(AckError::new(
                    AckKind::NotList,
                    0,
                    name.as_str(),
                    "command lists can not be nested",
                )
                .with_request(line))
            }
            _ => {
                session.buffer(line);
                Response::Suspended
            }
        }
    }

    fn replay(&self, session: &mut Session, backend: &dyn Backend) -> Response {
        let (mode, lines) = session.end_list();
        let mut results = Vec::with_capacity(lines.len());
        for (offset, line) in lines.iter().enumerate() {
            let index = offset + 1;
            let outcome = match tokenize(line) {
                Ok(request) if request.is_empty() => Ok(Payload::new()),
                Ok(request) => self.execute(&request, line, index, session, backend),
                Err(error) => {
                    let command = error.command().to_owned();
                    Err(AckError::new(AckKind::Argument, index, command, error.to_string())
                        .with_request(line.as_str()))
                }
            };
            match outcome {
                Ok(payload) => results.push(payload),
                Err(error) => return ack(error),
            }
            if session.is_closed() {
                break;
            }
        }
        Response::List {
            results,
            acknowledge_each: mode == ListMode::ListOk,
        }
    }

    fn execute(
        &self,
        request: &Request,
        line: &str,
        index: usize,
        session: &mut Session,
        backend: &dyn Backend,
    ) -> Result<Payload, AckError> {
        let name = request.name();
        let pattern = match self.registry.resolve(name, request.arguments()) {
            Resolution::Matched(pattern) => pattern,
            Resolution::Mismatch => {
                return Err(
                    AckError::new(AckKind::Argument, index, name, "incorrect arguments")
                        .with_request(line),
                );
            }
            Resolution::Unknown => {
                return Err(AckError::new(
                    AckKind::UnknownCommand,
                    index,
                    "",
                    format!("unknown command \"{name}\""),
                )
                .with_request(line));
            }
        };

        self.invoke(pattern, request, session, backend)
            .map_err(|error| AckError::from_command(error, index, name).with_request(line))
    }

    fn invoke(
        &self,
        pattern: &CommandPattern,
        request: &Request,
        session: &mut Session,
        backend: &dyn Backend,
    ) -> Result<Payload, CommandError> {
        let capability = pattern.capability();
        if capability.requires_authentication() && !session.is_authenticated() {
            return Err(CommandError::permission(pattern.name()));
        }
        if let Some(facility) = capability.facility()
            && !backend.provides(facility)
        {
            return Err(BackendError::Unavailable { facility }.into());
        }

        let arguments = pattern.arguments(request.arguments());
        let handler = pattern.handler();
        let mut context = CommandContext::new(session, backend, &self.registry, &self.settings);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&mut context, &arguments)));
        outcome.unwrap_or_else(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|text| (*text).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            error!(
                target: DISPATCH_TARGET,
                command = pattern.name(),
                pattern = pattern.text(),
                detail = %detail,
                "command handler panicked"
            );
            Err(CommandError::internal())
        })
    }
}

fn ack(error: AckError) -> Response {
    debug!(
        target: DISPATCH_TARGET,
        code = error.kind().code(),
        class = ?error.kind().class(),
        index = error.index(),
        request = error.request(),
        message = error.message(),
        "request acknowledged with error"
    );
    Response::Ack(error)
}
