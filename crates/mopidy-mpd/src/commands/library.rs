//! Music database lookups.

use mopidy_core::SearchField;

use super::{CatalogEntry, CommandContext, fields, not_implemented, stored_playlists};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

const ROOT: &str = "/";

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("count <tag> <needle>", Capability::Library, not_implemented),
    ("find {album|artist|title} <what>", Capability::Library, not_implemented),
    ("findadd {album|artist|title} <what>", Capability::Library, not_implemented),
    ("list {artist}", Capability::Library, not_implemented),
    ("list {album} [<artist>]", Capability::Library, not_implemented),
    ("listall [<uri>]", Capability::Library, not_implemented),
    ("listallinfo [<uri>]", Capability::Library, not_implemented),
    ("lsinfo [<uri>]", Capability::StoredPlaylists, lsinfo),
    ("search {album|artist|filename|title} <what>", Capability::Library, search),
    ("update [<uri>]", Capability::Library, update),
    ("rescan [<uri>]", Capability::Library, update),
];

/// Only the root is browsable; it lists the stored playlists.
fn lsinfo(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    match arguments.get("uri") {
        None | Some(ROOT) => stored_playlists::listing(context),
        Some(_) => Err(CommandError::not_implemented()),
    }
}

fn search(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let field = arguments
        .value(0)
        .unwrap_or_default()
        .parse::<SearchField>()
        .map_err(|error| CommandError::argument(error.to_string()))?;
    let what = arguments.get("what").unwrap_or_default();
    let mut payload = Payload::new();
    for track in context.backend().library().search(field, what)? {
        payload.append(fields::track(&track));
    }
    Ok(payload)
}

/// Shared by `update` and `rescan`; reports the refresh job number.
fn update(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let job = context.backend().library().refresh(arguments.get("uri"))?;
    Ok(Payload::new().with("updating_db", job))
}
