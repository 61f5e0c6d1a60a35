//! The play queue.

use mopidy_core::BackendError;

use super::{CatalogEntry, CommandContext, fields, not_implemented};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("add <uri>", Capability::CurrentPlaylist, not_implemented),
    ("addid <uri> [<songpos>]", Capability::CurrentPlaylist, not_implemented),
    ("clear", Capability::CurrentPlaylist, not_implemented),
    ("delete <range>", Capability::CurrentPlaylist, not_implemented),
    ("deleteid <songid>", Capability::CurrentPlaylist, not_implemented),
    ("move <range> <to>", Capability::CurrentPlaylist, not_implemented),
    ("moveid <songid> <to>", Capability::CurrentPlaylist, not_implemented),
    ("playlist", Capability::CurrentPlaylist, playlist),
    ("playlistfind <tag> <needle>", Capability::CurrentPlaylist, not_implemented),
    ("playlistid [<songid>]", Capability::CurrentPlaylist, playlistid),
    ("playlistinfo [<range>]", Capability::CurrentPlaylist, playlistinfo),
    ("playlistsearch <tag> <needle>", Capability::CurrentPlaylist, not_implemented),
    ("plchanges <version>", Capability::CurrentPlaylist, plchanges),
    ("plchangesposid <version>", Capability::CurrentPlaylist, not_implemented),
    ("shuffle [<range>]", Capability::CurrentPlaylist, not_implemented),
    ("swap <songpos1> <songpos2>", Capability::CurrentPlaylist, not_implemented),
    ("swapid <songid1> <songid2>", Capability::CurrentPlaylist, not_implemented),
];

fn whole_queue(context: &CommandContext<'_>) -> Result<Payload, CommandError> {
    let tracks = context.backend().current_playlist().tracks()?;
    Ok(fields::entries(tracks.iter().enumerate()))
}

/// Same output as a bare `playlistinfo`.
fn playlist(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    whole_queue(context)
}

/// Positions outside the queue yield an empty success.
fn playlistinfo(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let Some(range) = arguments.range("range")? else {
        return whole_queue(context);
    };
    let tracks = context.backend().current_playlist().tracks()?;
    let selected = range.clamp(tracks.len());
    let start = selected.start;
    let slice = tracks.get(selected).unwrap_or_default();
    Ok(fields::entries(
        slice
            .iter()
            .enumerate()
            .map(|(offset, track)| (start + offset, track)),
    ))
}

/// Unknown ids yield an empty success.
fn playlistid(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let Some(id) = arguments.optional_int("songid")? else {
        return whole_queue(context);
    };
    let Ok(id) = u32::try_from(id) else {
        return Ok(Payload::new());
    };
    match context.backend().current_playlist().entry_by_id(id) {
        Ok(entry) => Ok(fields::entry(&entry)),
        Err(BackendError::TrackNotFound { .. }) => Ok(Payload::new()),
        Err(error) => Err(error.into()),
    }
}

/// Every entry when the client's version is older than the queue's.
fn plchanges(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let version = arguments.int("version")?;
    let queue = context.backend().current_playlist();
    if version >= i64::from(queue.version()?) {
        return Ok(Payload::new());
    }
    let tracks = queue.tracks()?;
    Ok(fields::entries(tracks.iter().enumerate()))
}
