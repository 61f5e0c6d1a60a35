//! Response formatting for the line protocol.
//!
//! A success is one `Key: Value` line per field followed by `OK`. A failure
//! is a single `ACK` line. [`format`] is total and deterministic, so the
//! single-request and command-list paths share it.

use std::fmt::Display;
use std::io::{self, Write};

use super::errors::AckError;

const OK: &str = "OK";
const LIST_OK: &str = "list_OK";

/// Ordered `Key: Value` fields produced by a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<(String, String)>,
}

impl Payload {
    /// An empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
        self.fields.push((key.into(), value.to_string()));
    }

    /// Appends a field, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    /// Appends every field of `other`.
    pub fn append(&mut self, other: Self) {
        self.fields.extend(other.fields);
    }

    /// Fields in order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == key)
            .map(|(_, value)| value.as_str())
    }

    /// Reports whether no fields were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
    }
}

/// What the dispatcher decided to send for one request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A single successful command.
    Ok(Payload),
    /// A replayed command list that succeeded throughout.
    List {
        /// Payload of each buffered command in order.
        results: Vec<Payload>,
        /// Emit `list_OK` after every payload.
        acknowledge_each: bool,
    },
    /// A failure.
    Ack(AckError),
    /// The line was buffered; nothing is written.
    Suspended,
}

impl Response {
    /// Success without fields.
    #[must_use]
    pub fn ok() -> Self {
        Self::Ok(Payload::new())
    }
}

/// Renders `response` as lines without terminators.
#[must_use]
pub fn format(response: &Response) -> Vec<String> {
    match response {
        Response::Ok(payload) => payload.lines().chain([OK.to_owned()]).collect(),
        Response::List {
            results,
            acknowledge_each,
        } => {
            let mut lines = Vec::new();
            for payload in results {
                lines.extend(payload.lines());
                if *acknowledge_each {
                    lines.push(LIST_OK.to_owned());
                }
            }
            lines.push(OK.to_owned());
            lines
        }
        Response::Ack(error) => vec![error.to_string()],
        Response::Suspended => Vec::new(),
    }
}

/// Writes `response` with `\n` terminators and flushes.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    let lines = format(response);
    if lines.is_empty() {
        return Ok(());
    }
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::errors::AckKind;

    fn sample_payload() -> Payload {
        Payload::new().with("volume", 0).with("state", "stop")
    }

    #[test]
    fn success_lists_fields_then_ok() {
        let lines = format(&Response::Ok(sample_payload()));
        assert_eq!(lines, ["volume: 0", "state: stop", "OK"]);
    }

    #[test]
    fn empty_success_is_a_bare_ok() {
        assert_eq!(format(&Response::ok()), ["OK"]);
    }

    #[test]
    fn plain_list_concatenates_payloads() {
        let response = Response::List {
            results: vec![sample_payload(), Payload::new().with("a", 1)],
            acknowledge_each: false,
        };
        assert_eq!(
            format(&response),
            ["volume: 0", "state: stop", "a: 1", "OK"]
        );
    }

    #[test]
    fn acknowledged_list_separates_payloads() {
        let response = Response::List {
            results: vec![Payload::new(), Payload::new().with("a", 1)],
            acknowledge_each: true,
        };
        assert_eq!(format(&response), ["list_OK", "a: 1", "list_OK", "OK"]);
    }

    #[test]
    fn ack_is_a_single_line() {
        let error = AckError::new(AckKind::Argument, 0, "play", "incorrect arguments");
        assert_eq!(
            format(&Response::Ack(error)),
            ["ACK [2@0] {play} incorrect arguments"]
        );
    }

    #[test]
    fn suspended_writes_nothing() {
        let mut output = Vec::new();
        write_response(&mut output, &Response::Suspended).expect("write");
        assert!(output.is_empty());
    }

    #[test]
    fn formatting_twice_yields_identical_bytes() {
        let response = Response::List {
            results: vec![sample_payload()],
            acknowledge_each: true,
        };
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_response(&mut first, &response).expect("write first");
        write_response(&mut second, &response).expect("write second");
        assert_eq!(first, second);
        assert_eq!(
            String::from_utf8(first).expect("utf8"),
            "volume: 0\nstate: stop\nlist_OK\nOK\n"
        );
    }
}
