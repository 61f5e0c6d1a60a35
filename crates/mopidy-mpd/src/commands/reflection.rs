//! Introspection: `commands`, `notcommands`, `urlhandlers`, `tagtypes`.

use super::{CatalogEntry, CommandContext, not_implemented};
use crate::dispatch::{
    Arguments, Capability, CommandError, LIST_BEGIN, LIST_END, LIST_OK_BEGIN, Payload,
};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("commands", Capability::Connection, commands),
    ("notcommands", Capability::Connection, notcommands),
    ("urlhandlers", Capability::Server, urlhandlers),
    ("tagtypes", Capability::Server, not_implemented),
];

/// Sorted `command` lines for what the session may run, or may not.
fn command_names(context: &mut CommandContext<'_>, permitted: bool) -> Payload {
    let authenticated = context.session().is_authenticated();
    let registry = context.registry();
    let mut names: Vec<&str> = registry
        .commands()
        .filter(|(_, capability)| {
            let allowed = authenticated || !capability.requires_authentication();
            allowed == permitted
        })
        .map(|(name, _)| name)
        .collect();
    if permitted && authenticated {
        names.extend([LIST_BEGIN, LIST_OK_BEGIN, LIST_END]);
    }
    names.sort_unstable();
    names
        .into_iter()
        .fold(Payload::new(), |payload, name| payload.with("command", name))
}

fn commands(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(command_names(context, true))
}

fn notcommands(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(command_names(context, false))
}

fn urlhandlers(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(context
        .backend()
        .uri_schemes()
        .into_iter()
        .fold(Payload::new(), |payload, scheme| {
            payload.with("handler", format!("{scheme}:"))
        }))
}
