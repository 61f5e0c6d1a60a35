//! Backend façade for the MPD protocol server.
//!
//! Protocol handlers never own a backend. They receive `&dyn Backend` and
//! reach transport control, the play queue, the library, stored playlists and
//! the mixer through its accessors. Every façade call returns a
//! [`BackendResult`], and [`BackendError`] is the only failure a handler has
//! to translate.
//!
//! [`DummyBackend`] keeps everything in memory and backs both the server
//! binary and the tests.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod models;

pub use self::backend::{
    Backend, CurrentPlaylist, Facility, Library, Mixer, Playback, StoredPlaylists,
};
pub use self::dummy::DummyBackend;
pub use self::error::{BackendError, BackendResult};
pub use self::models::{
    AudioOutput, LibraryStats, PlaybackOptions, PlaybackState, Playlist, PlaylistEntry,
    SearchField, SearchFieldParseError, Track,
};
