//! Protocol command handlers.
//!
//! Each submodule exposes a static table of `(pattern, capability, handler)`
//! rows. [`CommandRegistry::standard`](crate::dispatch::CommandRegistry::standard)
//! registers the rows in the order [`catalog`] yields them.

mod connection;
mod current_playlist;
mod fields;
mod library;
mod output;
mod playback;
mod reflection;
mod status;
mod stored_playlists;

use mopidy_core::Backend;

use crate::dispatch::{
    Arguments, Capability, CommandError, CommandRegistry, Handler, Payload, ServerSettings,
    Session,
};

/// One row of a command table.
pub(crate) type CatalogEntry = (&'static str, Capability, Handler);

/// Every protocol command in registration order.
pub(crate) fn catalog() -> impl Iterator<Item = CatalogEntry> {
    [
        connection::COMMANDS,
        reflection::COMMANDS,
        status::COMMANDS,
        playback::COMMANDS,
        current_playlist::COMMANDS,
        stored_playlists::COMMANDS,
        library::COMMANDS,
        output::COMMANDS,
    ]
    .into_iter()
    .flatten()
    .copied()
}

/// Everything a handler may touch while running one command.
pub struct CommandContext<'a> {
    session: &'a mut Session,
    backend: &'a dyn Backend,
    registry: &'a CommandRegistry,
    settings: &'a ServerSettings,
}

impl<'a> CommandContext<'a> {
    /// Bundles the collaborators of one command invocation.
    pub fn new(
        session: &'a mut Session,
        backend: &'a dyn Backend,
        registry: &'a CommandRegistry,
        settings: &'a ServerSettings,
    ) -> Self {
        Self {
            session,
            backend,
            registry,
            settings,
        }
    }

    /// Connection state.
    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// The shared backend façade.
    #[must_use]
    pub fn backend(&self) -> &'a dyn Backend {
        self.backend
    }

    /// Registered commands.
    #[must_use]
    pub fn registry(&self) -> &'a CommandRegistry {
        self.registry
    }

    /// Server-wide settings.
    #[must_use]
    pub fn settings(&self) -> &'a ServerSettings {
        self.settings
    }
}

/// Handler for recognised commands without an implementation.
pub(crate) fn not_implemented(
    _context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Err(CommandError::not_implemented())
}
