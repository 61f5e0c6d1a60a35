use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag for the accept loop, open connections and signal waits.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownTrigger {
    flag: Arc<AtomicBool>,
}

impl ShutdownTrigger {
    /// Creates an untriggered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
