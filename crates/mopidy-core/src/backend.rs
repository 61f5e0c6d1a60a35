//! The capability façade handlers talk to.
//!
//! A backend is split into facilities, each behind its own trait. Protocol
//! code only ever holds `&dyn Backend` and reaches a facility through the
//! matching accessor, so a backend can be swapped without touching the
//! dispatcher. Implementations synchronise internally: every method takes
//! `&self` and may be called from any connection thread.

use std::fmt;
use std::time::Duration;

use crate::error::BackendResult;
use crate::models::{
    AudioOutput, LibraryStats, PlaybackOptions, PlaybackState, Playlist, PlaylistEntry,
    SearchField, Track,
};

/// Areas of functionality a backend may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facility {
    /// Transport control.
    Playback,
    /// The play queue.
    CurrentPlaylist,
    /// Track lookup and statistics.
    Library,
    /// Saved playlists.
    StoredPlaylists,
    /// Volume and outputs.
    Mixer,
}

impl fmt::Display for Facility {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Playback => "playback",
            Self::CurrentPlaylist => "current playlist",
            Self::Library => "library",
            Self::StoredPlaylists => "stored playlists",
            Self::Mixer => "mixer",
        };
        formatter.write_str(label)
    }
}

/// Entry point to a music backend.
pub trait Backend: Send + Sync {
    /// Human readable backend name.
    fn name(&self) -> &str;

    /// URI schemes the backend can play, for example `dummy`.
    fn uri_schemes(&self) -> Vec<String>;

    /// Reports whether `facility` is available.
    fn provides(&self, facility: Facility) -> bool;

    /// Transport control.
    fn playback(&self) -> &dyn Playback;

    /// The play queue.
    fn current_playlist(&self) -> &dyn CurrentPlaylist;

    /// Track lookup.
    fn library(&self) -> &dyn Library;

    /// Saved playlists.
    fn stored_playlists(&self) -> &dyn StoredPlaylists;

    /// Volume and outputs.
    fn mixer(&self) -> &dyn Mixer;
}

/// Transport control.
pub trait Playback: Send + Sync {
    /// Current player state.
    fn state(&self) -> BackendResult<PlaybackState>;

    /// The entry being played or paused, or last played when stopped.
    fn current(&self) -> BackendResult<Option<PlaylistEntry>>;

    /// Elapsed time in the current track.
    fn time_position(&self) -> BackendResult<Duration>;

    /// Repeat, random, single, consume and crossfade settings.
    fn options(&self) -> BackendResult<PlaybackOptions>;

    /// Starts `entry`, or with `None` resumes or starts the current entry.
    fn play(&self, entry: Option<PlaylistEntry>) -> BackendResult<()>;

    /// Pauses when playing.
    fn pause(&self) -> BackendResult<()>;

    /// Resumes when paused.
    fn resume(&self) -> BackendResult<()>;

    /// Stops playback, keeping the current entry.
    fn stop(&self) -> BackendResult<()>;

    /// Advances to the following entry; stops at the end of the playlist.
    fn next(&self) -> BackendResult<()>;

    /// Returns to the preceding entry; restarts the first one.
    fn previous(&self) -> BackendResult<()>;
}

/// The play queue.
pub trait CurrentPlaylist: Send + Sync {
    /// Every track in order.
    fn tracks(&self) -> BackendResult<Vec<Track>>;

    /// Number of tracks.
    fn len(&self) -> BackendResult<usize>;

    /// Reports whether the queue is empty.
    fn is_empty(&self) -> BackendResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Change counter, bumped on every modification.
    fn version(&self) -> BackendResult<u32>;

    /// Entry at `position`.
    fn entry_at(&self, position: usize) -> BackendResult<PlaylistEntry>;

    /// Entry whose track carries `id`.
    fn entry_by_id(&self, id: u32) -> BackendResult<PlaylistEntry>;

    /// Replaces the queue with the tracks of `playlist`.
    fn load(&self, playlist: &Playlist) -> BackendResult<()>;
}

/// Track lookup.
pub trait Library: Send + Sync {
    /// Tracks whose `field` contains `query`.
    fn search(&self, field: SearchField, query: &str) -> BackendResult<Vec<Track>>;

    /// Library totals.
    fn stats(&self) -> BackendResult<LibraryStats>;

    /// Starts a rescan below `uri`, or everything; returns the job number.
    fn refresh(&self, uri: Option<&str>) -> BackendResult<u32>;
}

/// Saved playlists.
pub trait StoredPlaylists: Send + Sync {
    /// Every stored playlist.
    fn playlists(&self) -> BackendResult<Vec<Playlist>>;

    /// The playlist called `name`.
    fn get(&self, name: &str) -> BackendResult<Playlist>;
}

/// Volume and outputs.
pub trait Mixer: Send + Sync {
    /// Volume in percent, `None` when unknown.
    fn volume(&self) -> BackendResult<Option<u8>>;

    /// Audio outputs.
    fn outputs(&self) -> BackendResult<Vec<AudioOutput>>;
}
