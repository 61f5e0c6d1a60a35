//! Connection housekeeping: `ping`, `close`, `kill`, `password`.

use super::{CatalogEntry, CommandContext};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("ping", Capability::Connection, ping),
    ("close", Capability::Connection, close),
    ("password <password>", Capability::Connection, password),
    ("kill", Capability::Server, kill),
];

fn ping(
    _context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(Payload::new())
}

fn close(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    context.session().close();
    Ok(Payload::new())
}

fn kill(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    context.session().request_kill();
    Ok(Payload::new())
}

fn password(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let Some(expected) = context.settings().password() else {
        return Err(CommandError::not_implemented());
    };
    if arguments.get("password") == Some(expected.expose()) {
        context.session().authenticate();
        Ok(Payload::new())
    } else {
        Err(CommandError::incorrect_password())
    }
}
