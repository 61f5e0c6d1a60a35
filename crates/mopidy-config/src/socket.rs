use std::fmt;
use std::fs::DirBuilder;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Hostname prefix selecting a Unix domain socket.
pub const UNIX_PREFIX: &str = "unix:";

/// Permissions applied to a directory created to hold the MPD socket.
#[cfg(unix)]
const SOCKET_DIR_MODE: u32 = 0o700;

/// Where the MPD server accepts clients, derived from `mpd/hostname` and
/// `mpd/port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEndpoint {
    Unix { path: Utf8PathBuf },
    Tcp { host: String, port: u16 },
}

impl SocketEndpoint {
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Maps the configured hostname and port onto an endpoint.
    ///
    /// `unix:/some/path` listens on a domain socket; the port is then unused.
    /// Anything else is a TCP host name or address.
    #[must_use]
    pub fn from_hostname(hostname: &str, port: u16) -> Self {
        hostname
            .strip_prefix(UNIX_PREFIX)
            .map_or_else(|| Self::tcp(hostname, port), Self::unix)
    }

    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        if let Self::Unix { path } = self {
            Some(path.as_path())
        } else {
            None
        }
    }

    /// Creates the directory that will contain a Unix socket.
    ///
    /// TCP endpoints need nothing on disk and succeed immediately. An
    /// existing directory is left untouched.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(socket) = self.unix_path() else {
            return Ok(());
        };
        let directory = socket
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(|| SocketPreparationError::MissingParent {
                path: socket.to_owned(),
            })?;
        if directory.is_dir() {
            return Ok(());
        }

        socket_dir_builder()
            .create(directory)
            .or_else(|error| match error.kind() {
                io::ErrorKind::AlreadyExists => Ok(()),
                _ => Err(error),
            })
            .map_err(|source| SocketPreparationError::CreateDirectory {
                path: directory.to_owned(),
                source,
            })
    }
}

fn socket_dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    std::os::unix::fs::DirBuilderExt::mode(&mut builder, SOCKET_DIR_MODE);
    builder
}

/// Renders the endpoint the way it is written in `mpd/hostname`, with the
/// port appended for TCP.
impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "{UNIX_PREFIX}{path}"),
            Self::Tcp { host, port } if host.contains(':') => {
                write!(formatter, "[{host}]:{port}")
            }
            Self::Tcp { host, port } => write!(formatter, "{host}:{port}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SocketPreparationError {
    #[error("MPD socket '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    #[error("could not create MPD socket directory '{path}': {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SocketEndpoint::unix("/run/mopidy/mpd.sock"), "unix:/run/mopidy/mpd.sock")]
    #[case(SocketEndpoint::tcp("127.0.0.1", 6600), "127.0.0.1:6600")]
    #[case(SocketEndpoint::tcp("::", 6601), "[::]:6601")]
    #[case(SocketEndpoint::tcp("music.local", 6602), "music.local:6602")]
    fn display_matches_hostname_notation(#[case] endpoint: SocketEndpoint, #[case] expected: &str) {
        assert_eq!(endpoint.to_string(), expected);
    }

    #[rstest]
    #[case("127.0.0.1", 6600, SocketEndpoint::tcp("127.0.0.1", 6600))]
    #[case("::", 6601, SocketEndpoint::tcp("::", 6601))]
    #[case("unix:/tmp/mpd.sock", 6600, SocketEndpoint::unix("/tmp/mpd.sock"))]
    #[case("unix:/tmp/mpd.sock", 1, SocketEndpoint::unix("/tmp/mpd.sock"))]
    fn hostname_selects_transport(
        #[case] hostname: &str,
        #[case] port: u16,
        #[case] expected: SocketEndpoint,
    ) {
        assert_eq!(SocketEndpoint::from_hostname(hostname, port), expected);
    }

    #[test]
    fn tcp_endpoint_needs_no_directory() {
        let endpoint = SocketEndpoint::tcp("127.0.0.1", 6600);
        assert!(endpoint.unix_path().is_none());
        endpoint.prepare_filesystem().expect("tcp endpoints skip preparation");
    }

    #[test]
    fn bare_socket_name_has_no_parent() {
        let error = SocketEndpoint::from_hostname("unix:mpd.sock", 6600)
            .prepare_filesystem()
            .expect_err("a bare file name has no directory to create");
        assert!(matches!(error, SocketPreparationError::MissingParent { path } if path == "mpd.sock"));
    }

    #[test]
    fn prepare_filesystem_creates_parent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let endpoint = SocketEndpoint::unix(base.join("nested/mpd.sock"));
        endpoint.prepare_filesystem().expect("parent directory should be created");
        assert!(base.join("nested").is_dir());

        endpoint.prepare_filesystem().expect("existing directory is accepted");
    }
}
