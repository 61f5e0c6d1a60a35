//! In-memory backend used by the server binary and tests.
//!
//! All state sits behind one mutex so every façade call observes a consistent
//! snapshot. Poisoned locks are recovered.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;

use crate::backend::{
    Backend, CurrentPlaylist, Facility, Library, Mixer, Playback, StoredPlaylists,
};
use crate::error::{BackendError, BackendResult};
use crate::models::{
    AudioOutput, LibraryStats, PlaybackOptions, PlaybackState, Playlist, PlaylistEntry,
    SearchField, Track,
};

const NAME: &str = "DummyBackend";

#[derive(Debug, Default)]
struct DummyState {
    state: PlaybackState,
    current: Option<PlaylistEntry>,
    position: Duration,
    options: PlaybackOptions,
    volume: Option<u8>,
    queue: Vec<Track>,
    version: u32,
    library: Vec<Track>,
    stored: Vec<Playlist>,
    refresh_jobs: u32,
    last_refresh: Option<OffsetDateTime>,
    missing: BTreeSet<Facility>,
}

impl DummyState {
    fn entry(&self, position: usize) -> BackendResult<PlaylistEntry> {
        self.queue
            .get(position)
            .map(|track| PlaylistEntry {
                position,
                track: track.clone(),
            })
            .ok_or(BackendError::PositionOutOfBounds { position })
    }

    fn start(&mut self, entry: PlaylistEntry) {
        self.current = Some(entry);
        self.position = Duration::ZERO;
        self.state = PlaybackState::Playing;
    }
}

/// Thread-safe in-memory backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    inner: Mutex<DummyState>,
}

impl DummyBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DummyState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds tracks to the searchable library.
    #[must_use]
    pub fn with_library(self, tracks: Vec<Track>) -> Self {
        self.lock().library.extend(tracks);
        self
    }

    /// Adds a stored playlist.
    #[must_use]
    pub fn with_playlist(self, playlist: Playlist) -> Self {
        self.lock().stored.push(playlist);
        self
    }

    /// Marks `facility` as unavailable.
    #[must_use]
    pub fn without(self, facility: Facility) -> Self {
        self.lock().missing.insert(facility);
        self
    }

    /// Sets the reported volume.
    pub fn set_volume(&self, volume: Option<u8>) {
        self.lock().volume = volume;
    }

    /// Sets the reported playback options.
    pub fn set_options(&self, options: PlaybackOptions) {
        self.lock().options = options;
    }

    /// Sets the elapsed time of the current track.
    pub fn set_time_position(&self, position: Duration) {
        self.lock().position = position;
    }
}

impl Backend for DummyBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn uri_schemes(&self) -> Vec<String> {
        vec!["dummy".to_owned()]
    }

    fn provides(&self, facility: Facility) -> bool {
        !self.lock().missing.contains(&facility)
    }

    fn playback(&self) -> &dyn Playback {
        self
    }

    fn current_playlist(&self) -> &dyn CurrentPlaylist {
        self
    }

    fn library(&self) -> &dyn Library {
        self
    }

    fn stored_playlists(&self) -> &dyn StoredPlaylists {
        self
    }

    fn mixer(&self) -> &dyn Mixer {
        self
    }
}

impl Playback for DummyBackend {
    fn state(&self) -> BackendResult<PlaybackState> {
        Ok(self.lock().state)
    }

    fn current(&self) -> BackendResult<Option<PlaylistEntry>> {
        Ok(self.lock().current.clone())
    }

    fn time_position(&self) -> BackendResult<Duration> {
        Ok(self.lock().position)
    }

    fn options(&self) -> BackendResult<PlaybackOptions> {
        Ok(self.lock().options)
    }

    fn play(&self, entry: Option<PlaylistEntry>) -> BackendResult<()> {
        let mut state = self.lock();
        if let Some(entry) = entry {
            state.start(entry);
            return Ok(());
        }
        match (state.state, state.current.clone()) {
            (PlaybackState::Paused, Some(_)) => state.state = PlaybackState::Playing,
            (PlaybackState::Playing, Some(_)) => {}
            (PlaybackState::Stopped, Some(entry)) => state.start(entry),
            (_, None) => {
                if let Ok(first) = state.entry(0) {
                    state.start(first);
                }
            }
        }
        Ok(())
    }

    fn pause(&self) -> BackendResult<()> {
        let mut state = self.lock();
        if state.state == PlaybackState::Playing {
            state.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn resume(&self) -> BackendResult<()> {
        let mut state = self.lock();
        if state.state == PlaybackState::Paused {
            state.state = PlaybackState::Playing;
        }
        Ok(())
    }

    fn stop(&self) -> BackendResult<()> {
        let mut state = self.lock();
        state.state = PlaybackState::Stopped;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn next(&self) -> BackendResult<()> {
        let mut state = self.lock();
        let Some(current) = state.current.as_ref().map(|entry| entry.position) else {
            return Ok(());
        };
        match state.entry(current.saturating_add(1)) {
            Ok(entry) => {
                let playing = state.state;
                state.start(entry);
                state.state = playing;
            }
            Err(_) => {
                state.current = None;
                state.state = PlaybackState::Stopped;
                state.position = Duration::ZERO;
            }
        }
        Ok(())
    }

    fn previous(&self) -> BackendResult<()> {
        let mut state = self.lock();
        let Some(current) = state.current.as_ref().map(|entry| entry.position) else {
            return Ok(());
        };
        if let Ok(entry) = state.entry(current.saturating_sub(1)) {
            let playing = state.state;
            state.start(entry);
            state.state = playing;
        }
        Ok(())
    }
}

impl CurrentPlaylist for DummyBackend {
    fn tracks(&self) -> BackendResult<Vec<Track>> {
        Ok(self.lock().queue.clone())
    }

    fn len(&self) -> BackendResult<usize> {
        Ok(self.lock().queue.len())
    }

    fn version(&self) -> BackendResult<u32> {
        Ok(self.lock().version)
    }

    fn entry_at(&self, position: usize) -> BackendResult<PlaylistEntry> {
        self.lock().entry(position)
    }

    fn entry_by_id(&self, id: u32) -> BackendResult<PlaylistEntry> {
        let state = self.lock();
        state
            .queue
            .iter()
            .position(|track| track.id == Some(id))
            .ok_or(BackendError::TrackNotFound { id })
            .and_then(|position| state.entry(position))
    }

    fn load(&self, playlist: &Playlist) -> BackendResult<()> {
        let mut state = self.lock();
        state.queue.clone_from(&playlist.tracks);
        state.version = state.version.wrapping_add(1);
        state.current = None;
        state.state = PlaybackState::Stopped;
        state.position = Duration::ZERO;
        Ok(())
    }
}

impl Library for DummyBackend {
    fn search(&self, field: SearchField, query: &str) -> BackendResult<Vec<Track>> {
        let needle = query.to_lowercase();
        Ok(self
            .lock()
            .library
            .iter()
            .filter(|track| field.value_of(track).to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn stats(&self) -> BackendResult<LibraryStats> {
        let state = self.lock();
        let artists: BTreeSet<&str> = state
            .library
            .iter()
            .flat_map(|track| track.artists.iter().map(String::as_str))
            .collect();
        let albums: BTreeSet<&str> = state
            .library
            .iter()
            .map(|track| track.album.as_str())
            .filter(|album| !album.is_empty())
            .collect();
        let db_playtime = state
            .library
            .iter()
            .filter_map(|track| track.length)
            .sum();
        Ok(LibraryStats {
            artists: count(artists.len()),
            albums: count(albums.len()),
            songs: count(state.library.len()),
            db_playtime,
            db_update: state.last_refresh,
            playtime: Duration::ZERO,
        })
    }

    fn refresh(&self, _uri: Option<&str>) -> BackendResult<u32> {
        let mut state = self.lock();
        let job = state.refresh_jobs;
        state.refresh_jobs = state.refresh_jobs.wrapping_add(1);
        state.last_refresh = Some(OffsetDateTime::now_utc());
        Ok(job)
    }
}

impl StoredPlaylists for DummyBackend {
    fn playlists(&self) -> BackendResult<Vec<Playlist>> {
        Ok(self.lock().stored.clone())
    }

    fn get(&self, name: &str) -> BackendResult<Playlist> {
        self.lock()
            .stored
            .iter()
            .find(|playlist| playlist.name == name)
            .cloned()
            .ok_or_else(|| BackendError::PlaylistNotFound {
                name: name.to_owned(),
            })
    }
}

impl Mixer for DummyBackend {
    fn volume(&self) -> BackendResult<Option<u8>> {
        Ok(self.lock().volume)
    }

    fn outputs(&self) -> BackendResult<Vec<AudioOutput>> {
        Ok(vec![AudioOutput {
            id: 0,
            name: NAME.to_owned(),
            enabled: true,
        }])
    }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
