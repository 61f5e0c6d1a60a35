//! Shared field layouts for tracks and playlists.

use mopidy_core::{Playlist, PlaylistEntry, Track};
use time::format_description::well_known::Rfc3339;

use crate::dispatch::{CommandError, Payload};

/// Library fields of `track`.
pub(super) fn track(track: &Track) -> Payload {
    Payload::new()
        .with("file", &track.uri)
        .with("Time", track.length.map_or(0, |length| length.as_secs()))
        .with("Artist", track.artist_names())
        .with("Title", &track.title)
        .with("Album", &track.album)
        .with("Track", track.track_no)
        .with("Date", &track.date)
}

/// Library fields plus the queue position and id of `entry`.
pub(super) fn entry(entry: &PlaylistEntry) -> Payload {
    track(&entry.track)
        .with("Pos", entry.position)
        .with("Id", entry.song_id())
}

/// Every track of the queue with positions.
pub(super) fn entries<'a>(tracks: impl IntoIterator<Item = (usize, &'a Track)>) -> Payload {
    let mut payload = Payload::new();
    for (position, track) in tracks {
        payload.append(entry(&PlaylistEntry {
            position,
            track: track.clone(),
        }));
    }
    payload
}

/// `playlist` and `Last-Modified` lines of a stored playlist.
pub(super) fn playlist(playlist: &Playlist) -> Result<Payload, CommandError> {
    let mut payload = Payload::new().with("playlist", &playlist.name);
    if let Some(modified) = playlist.last_modified {
        let stamp = modified
            .format(&Rfc3339)
            .map_err(|_| CommandError::internal())?;
        payload.push("Last-Modified", stamp);
    }
    Ok(payload)
}
