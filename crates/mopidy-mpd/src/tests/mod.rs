//! Behavioural suites for the server.

mod protocol_behaviour;
pub(crate) mod support;
