//! Behavioural tests for MPD sessions over a real TCP listener.

use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mopidy_config::SecretString;
use mopidy_core::{DummyBackend, Playlist, Track};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{StaticConfigLoader, bootstrap_with};
use crate::health::StructuredHealthReporter;
use crate::transport::{ListenerHandle, ShutdownTrigger};

use super::support::ephemeral_config;

struct ProtocolWorld {
    trigger: ShutdownTrigger,
    listener: Option<ListenerHandle>,
    address: Option<SocketAddr>,
    client: Option<BufReader<TcpStream>>,
    greeting: String,
    response: Vec<String>,
}

impl ProtocolWorld {
    fn new() -> Self {
        Self {
            trigger: ShutdownTrigger::new(),
            listener: None,
            address: None,
            client: None,
            greeting: String::new(),
            response: Vec::new(),
        }
    }

    fn start(&mut self, password: Option<String>) {
        let mut config = ephemeral_config();
        config.mpd.password = password.map(SecretString::new);
        let backend = Arc::new(DummyBackend::new().with_playlist(Playlist::new(
            "mix",
            vec![
                Track::new("dummy:a", "A").with_id(1),
                Track::new("dummy:b", "B").with_id(2),
            ],
        )));
        let server = bootstrap_with(
            &StaticConfigLoader::new(config),
            Arc::new(StructuredHealthReporter::new()),
            backend,
        )
        .expect("bootstrap server");
        let listener = server.listen(self.trigger.clone()).expect("start listener");
        let address = listener.local_addr().expect("tcp listener address");

        let stream = TcpStream::connect(address).expect("connect client");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("client read timeout");
        let mut client = BufReader::new(stream);
        self.greeting = read_line(&mut client);

        self.listener = Some(listener);
        self.address = Some(address);
        self.client = Some(client);
    }

    fn client(&mut self) -> &mut BufReader<TcpStream> {
        self.client.as_mut().expect("client connected")
    }

    fn write(&mut self, line: &str) {
        let stream = self.client().get_mut();
        stream.write_all(line.as_bytes()).expect("write request");
        stream.write_all(b"\n").expect("write newline");
        stream.flush().expect("flush request");
    }

    fn read_response(&mut self) {
        self.response.clear();
        loop {
            let line = read_line(self.client());
            let done = line.is_empty() || line == "OK" || line.starts_with("ACK ");
            if !line.is_empty() {
                self.response.push(line);
            }
            if done {
                break;
            }
        }
    }
}

impl Drop for ProtocolWorld {
    fn drop(&mut self) {
        self.trigger.trigger();
        if let Some(handle) = self.listener.take() {
            let _ = handle.join();
        }
    }
}

fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    line.trim_end().to_owned()
}

#[fixture]
fn world() -> RefCell<ProtocolWorld> {
    RefCell::new(ProtocolWorld::new())
}

#[given("a running MPD server")]
fn given_server(world: &RefCell<ProtocolWorld>) {
    world.borrow_mut().start(None);
}

#[given("a running MPD server protected by the password \"{password}\"")]
fn given_protected_server(world: &RefCell<ProtocolWorld>, password: String) {
    world.borrow_mut().start(Some(password));
}

#[when("the client sends {line}")]
fn when_client_sends(world: &RefCell<ProtocolWorld>, line: String) {
    let mut world = world.borrow_mut();
    world.write(&line);
    world.read_response();
}

#[when("the client queues {line}")]
fn when_client_queues(world: &RefCell<ProtocolWorld>, line: String) {
    world.borrow_mut().write(&line);
}

#[then("the greeting is {line}")]
fn then_greeting(world: &RefCell<ProtocolWorld>, line: String) {
    assert_eq!(world.borrow().greeting, line);
}

#[then("the response is {line}")]
fn then_response_is(world: &RefCell<ProtocolWorld>, line: String) {
    assert_eq!(world.borrow().response, [line]);
}

#[then("the response contains {line}")]
fn then_response_contains(world: &RefCell<ProtocolWorld>, line: String) {
    let world = world.borrow();
    assert!(
        world.response.contains(&line),
        "expected {line:?} in {:?}",
        world.response
    );
}

#[then("the response ends with {line}")]
fn then_response_ends_with(world: &RefCell<ProtocolWorld>, line: String) {
    let world = world.borrow();
    assert_eq!(world.response.last(), Some(&line), "{:?}", world.response);
}

#[then("the response has {count} lines")]
fn then_response_length(world: &RefCell<ProtocolWorld>, count: usize) {
    let world = world.borrow();
    assert_eq!(world.response.len(), count, "{:?}", world.response);
}

#[then("the server closes the connection")]
fn then_connection_closed(world: &RefCell<ProtocolWorld>) {
    let mut world = world.borrow_mut();
    assert_eq!(read_line(world.client()), "", "expected end of stream");
}

#[then("the server has shut down")]
fn then_server_shut_down(world: &RefCell<ProtocolWorld>) {
    let mut world = world.borrow_mut();
    let deadline = Instant::now() + Duration::from_secs(2);
    while !world.trigger.is_triggered() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(world.trigger.is_triggered(), "kill should trigger shutdown");
    let handle = world.listener.take().expect("listener running");
    handle.join().expect("accept loop exits");
    let address = world.address.expect("address recorded");
    assert!(
        TcpStream::connect(address).is_err(),
        "listener should no longer accept"
    );
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "A client is greeted and can ping"
)]
fn greeting_and_ping(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "Unknown commands keep the connection usable"
)]
fn unknown_commands(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "A command list acknowledges each command"
)]
fn command_list_ok(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "A failing command list reports its position"
)]
fn failing_command_list(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "A password unlocks the remaining commands"
)]
fn password_unlocks(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mpd_protocol.feature",
    name = "Closing ends the connection"
)]
fn closing(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/mpd_protocol.feature", name = "Kill stops the server")]
fn kill_stops_server(#[from(world)] world: RefCell<ProtocolWorld>) {
    drop(world);
}
