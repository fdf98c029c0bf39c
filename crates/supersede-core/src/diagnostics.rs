//! Human-readable status messages for callers.
//!
//! The pipeline never uses these for control flow. They exist so a caller
//! (a controller, a service) can surface what happened to a user or a log.
//! Every message is also emitted through `tracing` when it is recorded.

use tracing::{debug, error};

/// How serious a diagnostic message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something the caller should surface; archival did not complete.
    Error,
    /// Progress information.
    Debug,
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Message severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

/// Ordered collection of the messages produced during one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an error message for `entity`.
    pub fn error(&mut self, entity: &str, message: String) {
        error!(entity, "{message}");
        self.push(Severity::Error, message);
    }

    /// Record a debug message for `entity`.
    pub fn debug(&mut self, entity: &str, message: String) {
        debug!(entity, "{message}");
        self.push(Severity::Debug, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(Diagnostic { severity, message });
    }

    /// The most recent message of the given severity.
    pub fn latest(&self, severity: Severity) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|d| d.severity == severity)
            .map(|d| d.message.as_str())
    }

    /// Whether any error message was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// All messages in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded messages.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
