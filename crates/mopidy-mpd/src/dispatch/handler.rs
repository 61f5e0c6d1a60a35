//! Connection handler that speaks the line protocol.
//!
//! Each accepted stream gets the greeting, then a loop of read one line,
//! dispatch it, write the response. The loop ends on `close`, `kill`, end of
//! stream, read timeout, an oversized line or a transport failure.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mopidy_core::Backend;
use tracing::{debug, info, warn};

use crate::transport::{ConnectionHandler, ConnectionStream, ShutdownTrigger};

use super::DISPATCH_TARGET;
use super::dispatcher::Dispatcher;
use super::errors::{AckError, AckKind};
use super::response::{Response, write_response};

/// First line written to every accepted connection.
pub(crate) const GREETING: &str = "OK MPD 0.16.0";

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Per-connection resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConnectionLimits {
    /// Connections served at once; later ones are refused.
    pub(crate) max_connections: usize,
    /// Read timeout while waiting for the next request.
    pub(crate) timeout: Duration,
}

/// Serves MPD clients over accepted streams.
pub(crate) struct MpdConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    backend: Arc<dyn Backend>,
    limits: ConnectionLimits,
    active: Arc<AtomicUsize>,
    shutdown: ShutdownTrigger,
}

impl MpdConnectionHandler {
    pub(crate) fn new(
        dispatcher: Arc<Dispatcher>,
        backend: Arc<dyn Backend>,
        limits: ConnectionLimits,
        shutdown: ShutdownTrigger,
    ) -> Self {
        Self {
            dispatcher,
            backend,
            limits,
            active: Arc::new(AtomicUsize::new(0)),
            shutdown,
        }
    }

    fn serve(&self, mut stream: ConnectionStream) {
        let Some(_slot) = ConnectionSlot::acquire(&self.active, self.limits.max_connections) else {
            warn!(
                target: DISPATCH_TARGET,
                limit = self.limits.max_connections,
                "refusing connection"
            );
            let refusal = AckError::new(AckKind::NotImplemented, 0, "", "too many connections");
            let _ = write_response(&mut stream, &Response::Ack(refusal));
            return;
        };

        if let Err(error) = stream.set_read_timeout(Some(self.limits.timeout)) {
            warn!(target: DISPATCH_TARGET, %error, "failed to set read timeout");
        }
        if let Err(error) = write_line(&mut stream, GREETING) {
            debug!(target: DISPATCH_TARGET, %error, "client left before greeting");
            return;
        }

        let mut session = self.dispatcher.new_session();
        let mut reader = LineReader::default();
        while !self.shutdown.is_triggered() {
            let bytes = match reader.read_line(&mut stream) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    break;
                }
                Err(error) if is_timeout(&error) => {
                    debug!(target: DISPATCH_TARGET, "connection timed out");
                    break;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                    break;
                }
            };
            let response = match String::from_utf8(bytes) {
                Ok(text) => {
                    let line = text.trim_end_matches(['\n', '\r']);
                    debug!(target: DISPATCH_TARGET, request = line, "dispatching request");
                    self.dispatcher
                        .dispatch(line, &mut session, self.backend.as_ref())
                }
                Err(error) => {
                    debug!(target: DISPATCH_TARGET, %error, "request is not UTF-8");
                    Response::Ack(AckError::new(
                        AckKind::Argument,
                        0,
                        "",
                        "request is not valid UTF-8",
                    ))
                }
            };
            if let Err(error) = write_response(&mut stream, &response) {
                debug!(target: DISPATCH_TARGET, %error, "failed to write response");
                break;
            }
            if session.kill_requested() {
                info!(target: DISPATCH_TARGET, "kill requested by client");
                self.shutdown.trigger();
            }
            if session.is_closed() {
                break;
            }
        }
    }
}

impl ConnectionHandler for MpdConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.serve(stream);
    }
}

/// Counts a connection against the limit until dropped.
struct ConnectionSlot<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ConnectionSlot<'a> {
    fn acquire(active: &'a AtomicUsize, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < limit).then_some(current + 1)
            })
            .ok()
            .map(|_| Self { active })
    }
}

impl Drop for ConnectionSlot<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

fn write_line(stream: &mut ConnectionStream, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Splits a byte stream into request lines, keeping bytes read past a newline
/// for the next call.
#[derive(Debug, Default)]
struct LineReader {
    pending: Vec<u8>,
}

impl LineReader {
    /// Returns the next line including its `\n`, or the unterminated tail at
    /// end of stream. `Ok(None)` means the stream ended with nothing pending.
    fn read_line<R: Read>(&mut self, stream: &mut R) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = [0_u8; 1024];
        loop {
            if let Some(position) = self.pending.iter().position(|byte| *byte == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=position).collect();
                enforce_request_limit(line.len())?;
                return Ok(Some(line));
            }
            enforce_request_limit(self.pending.len())?;

            let bytes_read = read_chunk_with_retry(stream, &mut chunk)?;
            if bytes_read == 0 {
                return Ok(if self.pending.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.pending))
                });
            }
            self.pending.extend_from_slice(chunk.get(..bytes_read).unwrap_or_default());
        }
    }
}

fn read_chunk_with_retry<R: Read>(stream: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

fn enforce_request_limit(size: usize) -> io::Result<()> {
    if size > MAX_REQUEST_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "request exceeds maximum size",
        ));
    }
    Ok(())
}
