//! Saved playlists.

use super::{CatalogEntry, CommandContext, fields, not_implemented};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("listplaylist <name>", Capability::StoredPlaylists, not_implemented),
    ("listplaylistinfo <name>", Capability::StoredPlaylists, not_implemented),
    ("listplaylists", Capability::StoredPlaylists, listplaylists),
    ("load <name>", Capability::StoredPlaylists, load),
    ("playlistadd <name> <uri>", Capability::StoredPlaylists, not_implemented),
    ("playlistclear <name>", Capability::StoredPlaylists, not_implemented),
    ("playlistdelete <name> <songpos>", Capability::StoredPlaylists, not_implemented),
    ("playlistmove <name> <from> <to>", Capability::StoredPlaylists, not_implemented),
    ("rename <name> <new_name>", Capability::StoredPlaylists, not_implemented),
    ("rm <name>", Capability::StoredPlaylists, not_implemented),
    ("save <name>", Capability::StoredPlaylists, not_implemented),
];

/// `playlist` and `Last-Modified` lines for every stored playlist.
pub(super) fn listing(context: &CommandContext<'_>) -> Result<Payload, CommandError> {
    let mut payload = Payload::new();
    for playlist in context.backend().stored_playlists().playlists()? {
        payload.append(fields::playlist(&playlist)?);
    }
    Ok(payload)
}

fn listplaylists(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    listing(context)
}

/// Replaces the queue with the named playlist.
fn load(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let name = arguments.get("name").unwrap_or_default();
    let backend = context.backend();
    let playlist = backend.stored_playlists().get(name)?;
    backend.current_playlist().load(&playlist)?;
    Ok(Payload::new())
}
