//! Immutable values exchanged between the façade and its callers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;

/// A playable track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    /// Backend URI, for example `dummy:track:1`.
    pub uri: String,
    /// Track title.
    pub title: String,
    /// Performing artists, in credit order.
    pub artists: Vec<String>,
    /// Album name.
    pub album: String,
    /// Position on the album, zero when unknown.
    pub track_no: u32,
    /// Release date as written by the source.
    pub date: String,
    /// Duration, when known.
    pub length: Option<Duration>,
    /// Bitrate in kbit/s, when known.
    pub bitrate: Option<u32>,
    /// Stable identifier inside the current playlist.
    pub id: Option<u32>,
}

impl Track {
    /// Builds a track with only a URI and title.
    #[must_use]
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the current-playlist identifier.
    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_length(mut self, length: Duration) -> Self {
        self.length = Some(length);
        self
    }

    /// Artists joined for display.
    #[must_use]
    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }
}

/// A named, ordered list of tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    /// Display name, unique among stored playlists.
    pub name: String,
    /// Tracks in play order.
    pub tracks: Vec<Track>,
    /// Last modification time, when known.
    pub last_modified: Option<OffsetDateTime>,
}

impl Playlist {
    /// Builds a playlist from its name and tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
            last_modified: None,
        }
    }
}

/// A track together with its position in the current playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Zero-based position.
    pub position: usize,
    /// The track at that position.
    pub track: Track,
}

impl PlaylistEntry {
    /// Identifier reported to clients: the track id, or its position.
    #[must_use]
    pub fn song_id(&self) -> u64 {
        self.track
            .id
            .map_or_else(|| u64::try_from(self.position).unwrap_or(u64::MAX), u64::from)
    }
}

/// What the player is doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Audio is being produced.
    Playing,
    /// Playback is held at the current position.
    Paused,
    /// Nothing is playing.
    #[default]
    Stopped,
}

/// Player modes reported by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Repeat the playlist.
    pub repeat: bool,
    /// Play tracks in random order.
    pub random: bool,
    /// Stop after the current track.
    pub single: bool,
    /// Remove tracks once played.
    pub consume: bool,
    /// Crossfade length in seconds.
    pub crossfade: u32,
}

/// Track field a library search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// Album name.
    Album,
    /// Any credited artist.
    Artist,
    /// Track URI.
    Filename,
    /// Track title.
    Title,
}

impl SearchField {
    /// Returns the text of `track` this field selects.
    #[must_use]
    pub fn value_of(self, track: &Track) -> String {
        match self {
            Self::Album => track.album.clone(),
            Self::Artist => track.artist_names(),
            Self::Filename => track.uri.clone(),
            Self::Title => track.title.clone(),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Filename => "filename",
            Self::Title => "title",
        };
        formatter.write_str(label)
    }
}

/// Error returned when parsing a search field fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported search field: {0}")]
pub struct SearchFieldParseError(String);

impl FromStr for SearchField {
    type Err = SearchFieldParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "album" => Ok(Self::Album),
            "artist" => Ok(Self::Artist),
            "filename" => Ok(Self::Filename),
            "title" => Ok(Self::Title),
            other => Err(SearchFieldParseError(other.to_owned())),
        }
    }
}

/// Library totals reported by `stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    /// Distinct artists.
    pub artists: u64,
    /// Distinct albums.
    pub albums: u64,
    /// Tracks.
    pub songs: u64,
    /// Sum of all track lengths.
    pub db_playtime: Duration,
    /// Last library refresh.
    pub db_update: Option<OffsetDateTime>,
    /// Time spent playing since start.
    pub playtime: Duration,
}

/// An audio sink listed by `outputs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioOutput {
    /// Output number.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Whether audio is routed to it.
    pub enabled: bool,
}
