//! Tests for the socket listener.

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use mopidy_config::SocketEndpoint;
use rstest::{fixture, rstest};

use super::listener::SocketListener;
use super::{ConnectionHandler, ConnectionStream, ListenerError, ShutdownTrigger};

struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[fixture]
fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn counting(count: &Arc<AtomicUsize>) -> Arc<dyn ConnectionHandler> {
    Arc::new(CountingHandler {
        count: Arc::clone(count),
    })
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn tcp_listener_accepts_connections(counter: Arc<AtomicUsize>) {
    let listener =
        SocketListener::bind(&SocketEndpoint::tcp("127.0.0.1", 0)).expect("bind tcp listener");
    let handle = listener
        .start(counting(&counter), ShutdownTrigger::new())
        .expect("start listener");
    let addr = handle.local_addr().expect("listener should report local address");

    TcpStream::connect(addr).expect("connect first client");
    TcpStream::connect(addr).expect("connect second client");

    assert!(wait_for_count(&counter, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn external_trigger_stops_the_accept_loop(counter: Arc<AtomicUsize>) {
    let trigger = ShutdownTrigger::new();
    let listener =
        SocketListener::bind(&SocketEndpoint::tcp("127.0.0.1", 0)).expect("bind tcp listener");
    let handle = listener
        .start(counting(&counter), trigger.clone())
        .expect("start listener");

    trigger.trigger();
    handle.join().expect("accept loop should exit");
}

#[rstest]
fn unresolvable_hosts_fail_to_bind() {
    let endpoint = SocketEndpoint::tcp("host.invalid", 6600);
    let error = SocketListener::bind(&endpoint).expect_err("bind should fail");
    assert!(matches!(
        error,
        ListenerError::Resolve { .. } | ListenerError::ResolveEmpty { .. }
    ));
}

#[cfg(unix)]
#[fixture]
fn unix_tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[cfg(unix)]
#[rstest]
fn unix_listener_cleans_stale_socket_files(
    unix_tempdir: tempfile::TempDir,
    counter: Arc<AtomicUsize>,
) {
    let path = unix_tempdir.path().join("mpd.sock");
    {
        let _stale = std::os::unix::net::UnixListener::bind(&path).expect("bind stale listener");
    }
    assert!(path.exists(), "stale socket should remain");

    let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path"));
    let listener = SocketListener::bind(&endpoint).expect("bind new listener");
    let handle = listener
        .start(counting(&counter), ShutdownTrigger::new())
        .expect("start listener");

    std::os::unix::net::UnixStream::connect(&path).expect("connect unix client");
    assert!(wait_for_count(&counter, 1), "expected one connection");

    handle.shutdown();
    handle.join().expect("join listener");
    assert!(
        !path.exists(),
        "listener should remove unix socket on shutdown"
    );
}

#[cfg(unix)]
#[rstest]
fn unix_listener_rejects_in_use_socket(unix_tempdir: tempfile::TempDir) {
    let path = unix_tempdir.path().join("mpd.sock");
    let _existing = std::os::unix::net::UnixListener::bind(&path).expect("bind existing listener");

    let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path"));
    let error = SocketListener::bind(&endpoint).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::UnixInUse { .. }));
}
