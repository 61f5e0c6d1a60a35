//! Per-connection protocol state.

/// Command-list buffering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Requests run as they arrive.
    #[default]
    None,
    /// Buffering after `command_list_begin`.
    List,
    /// Buffering after `command_list_ok_begin`.
    ListOk,
}

/// State owned by one connection worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    list_mode: ListMode,
    buffered: Vec<String>,
    closed: bool,
    authenticated: bool,
    kill_requested: bool,
}

impl Session {
    /// Starts a session; it begins authenticated unless a password is set.
    #[must_use]
    pub fn new(password_required: bool) -> Self {
        Self {
            authenticated: !password_required,
            ..Self::default()
        }
    }

    /// Current buffering mode.
    #[must_use]
    pub fn list_mode(&self) -> ListMode {
        self.list_mode
    }

    /// Raw request lines waiting for `command_list_end`.
    #[must_use]
    pub fn buffered(&self) -> &[String] {
        &self.buffered
    }

    /// Reports whether the client asked to close.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reports whether commands beyond the connection set are allowed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Reports whether the client asked the server to stop.
    #[must_use]
    pub fn kill_requested(&self) -> bool {
        self.kill_requested
    }

    pub(crate) fn begin_list(&mut self, mode: ListMode) {
        self.list_mode = mode;
        self.buffered.clear();
    }

    pub(crate) fn buffer(&mut self, line: &str) {
        self.buffered.push(line.to_owned());
    }

    /// Leaves list mode, handing back the buffered lines.
    pub(crate) fn end_list(&mut self) -> (ListMode, Vec<String>) {
        let mode = std::mem::take(&mut self.list_mode);
        (mode, std::mem::take(&mut self.buffered))
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    pub(crate) fn authenticate(&mut self) {
        self.authenticated = true;
    }

    pub(crate) fn request_kill(&mut self) {
        self.kill_requested = true;
        self.closed = true;
    }
}
