//! Failures reported by backend implementations.

use thiserror::Error;

use crate::backend::Facility;

/// Errors raised by the façade traits.
///
/// The `Display` text of the first three variants is shown to protocol
/// clients verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// A playlist position past the end was requested.
    #[error("Position out of bounds")]
    PositionOutOfBounds {
        /// Requested position.
        position: usize,
    },
    /// No track in the current playlist carries the id.
    #[error("Track with ID \"{id}\" not found")]
    TrackNotFound {
        /// Requested id.
        id: u32,
    },
    /// No stored playlist has the name.
    #[error("No such playlist")]
    PlaylistNotFound {
        /// Requested name.
        name: String,
    },
    /// The backend does not offer the facility.
    #[error("{facility} is unavailable")]
    Unavailable {
        /// Missing facility.
        facility: Facility,
    },
    /// Any other backend failure.
    #[error("backend failure: {message}")]
    Internal {
        /// Detail for server-side logs.
        message: String,
    },
}

/// Result alias used by the façade.
pub type BackendResult<T> = Result<T, BackendError>;
