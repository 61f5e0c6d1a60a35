//! Status queries: `status`, `currentsong`, `stats` and friends.

use mopidy_core::{Facility, PlaybackState};

use super::{CatalogEntry, CommandContext, fields, not_implemented};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("clearerror", Capability::Status, not_implemented),
    ("currentsong", Capability::Status, currentsong),
    ("idle <subsystems>...", Capability::Status, not_implemented),
    ("noidle", Capability::Status, not_implemented),
    ("stats", Capability::Library, stats),
    ("status", Capability::Status, status),
    ("replay_gain_status", Capability::Status, replay_gain_status),
];

fn currentsong(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let current = context.backend().playback().current()?;
    Ok(current.as_ref().map(fields::entry).unwrap_or_default())
}

fn status(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let backend = context.backend();
    let playback = backend.playback();
    let state = playback.state()?;
    let options = playback.options()?;
    let volume = if backend.provides(Facility::Mixer) {
        backend.mixer().volume()?
    } else {
        None
    };
    let (version, length) = if backend.provides(Facility::CurrentPlaylist) {
        let queue = backend.current_playlist();
        (queue.version()?, queue.len()?)
    } else {
        (0, 0)
    };

    let mut payload = Payload::new()
        .with("volume", volume.unwrap_or(0))
        .with("repeat", u8::from(options.repeat))
        .with("random", u8::from(options.random))
        .with("single", u8::from(options.single))
        .with("consume", u8::from(options.consume))
        .with("playlist", version)
        .with("playlistlength", length)
        .with("xfade", options.crossfade)
        .with("state", state_name(state));

    let current = playback.current()?;
    if let Some(entry) = &current {
        payload.push("song", entry.position);
        payload.push("songid", entry.song_id());
    }
    if state != PlaybackState::Stopped {
        let track = current.map(|entry| entry.track).unwrap_or_default();
        let total = track.length.map_or(0, |length| length.as_secs());
        let elapsed = playback.time_position()?.as_secs().min(total);
        payload.push("time", format!("{elapsed}:{total}"));
        payload.push("bitrate", track.bitrate.unwrap_or(0));
    }
    Ok(payload)
}

fn state_name(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "play",
        PlaybackState::Paused => "pause",
        PlaybackState::Stopped => "stop",
    }
}

fn stats(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let stats = context.backend().library().stats()?;
    let db_update = stats
        .db_update
        .map_or(0, |stamp| stamp.unix_timestamp().max(0));
    Ok(Payload::new()
        .with("artists", stats.artists)
        .with("albums", stats.albums)
        .with("songs", stats.songs)
        .with("uptime", context.settings().uptime_secs())
        .with("db_playtime", stats.db_playtime.as_secs())
        .with("db_update", db_update)
        .with("playtime", stats.playtime.as_secs()))
}

fn replay_gain_status(
    _context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(Payload::new().with("replay_gain_mode", "off"))
}
