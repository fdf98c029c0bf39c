//! The context object carried through one update cycle.
//!
//! An [`UpdateCycle`] is created by the capture stage and handed to every
//! later stage. It owns the snapshot, the flags a caller checks afterwards
//! (ready, success), the re-entrancy flag raised while the back-link write
//! is in flight, and the diagnostics.

use supersede_types::RecordId;

use crate::diagnostics::Diagnostics;
use crate::error::ReplaceError;
use crate::snapshot::Snapshot;

/// What the post-write stage did for one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchivalOutcome {
    /// A history row was written and the entity now points at it.
    Linked {
        /// Identity of the new history row.
        history_id: RecordId,
    },
    /// The write was the back-link itself; nothing was archived.
    Suppressed,
    /// Capture failed for this cycle, so there is nothing to archive.
    NotReady,
    /// The snapshot was already consumed earlier in this cycle.
    AlreadyArchived,
    /// The history row could not be written.
    ArchiveFailed,
    /// The history row was written but the back-link write failed.
    LinkFailed {
        /// Identity of the orphaned history row.
        history_id: RecordId,
    },
}

/// State of one capture, write, archive, link cycle.
#[derive(Debug)]
pub struct UpdateCycle {
    entity: String,
    ready: bool,
    success: bool,
    linking: bool,
    snapshot: Option<Snapshot>,
    link_field: Option<String>,
    history_id: Option<RecordId>,
    outcome: Option<ArchivalOutcome>,
    error: Option<ReplaceError>,
    diagnostics: Diagnostics,
}

impl UpdateCycle {
    /// Start a cycle for the given entity type. Nothing is captured yet.
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_owned(),
            ready: false,
            success: false,
            linking: false,
            snapshot: None,
            link_field: None,
            history_id: None,
            outcome: None,
            error: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Entity type alias this cycle belongs to.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Whether capture succeeded. Archival only happens on ready cycles.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the full archive-and-link sequence completed.
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the back-link write is currently in flight.
    pub const fn is_linking(&self) -> bool {
        self.linking
    }

    /// The captured snapshot, until the coordinator consumes it.
    pub const fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Identity of the history row written by this cycle, if any.
    pub const fn history_id(&self) -> Option<&RecordId> {
        self.history_id.as_ref()
    }

    /// Outcome of the last non-suppressed post-write stage.
    pub const fn outcome(&self) -> Option<&ArchivalOutcome> {
        self.outcome.as_ref()
    }

    /// The most recent recovered error.
    pub const fn error(&self) -> Option<&ReplaceError> {
        self.error.as_ref()
    }

    /// Messages recorded during the cycle.
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Turn the cycle into a strict result: the history row id on success,
    /// the recovered error otherwise.
    ///
    /// The primary write has already happened either way; this only changes
    /// how the outcome is reported.
    pub fn into_result(self) -> Result<RecordId, ReplaceError> {
        match (self.success, self.history_id, self.error) {
            (true, Some(history_id), _) => Ok(history_id),
            (_, _, Some(error)) => Err(error),
            _ => Err(ReplaceError::Incomplete {
                entity: self.entity,
            }),
        }
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub(crate) fn mark_ready(&mut self, snapshot: Snapshot, link_field: String) {
        self.snapshot = Some(snapshot);
        self.link_field = Some(link_field);
        self.ready = true;
    }

    /// Hand the snapshot and link field to the coordinator, exactly once.
    pub(crate) fn take_capture(&mut self) -> Option<(Snapshot, String)> {
        self.snapshot.take().zip(self.link_field.take())
    }

    pub(crate) const fn set_linking(&mut self, linking: bool) {
        self.linking = linking;
    }

    pub(crate) fn mark_success(&mut self, history_id: RecordId) {
        self.history_id = Some(history_id);
        self.success = true;
    }

    pub(crate) fn record_history_id(&mut self, history_id: RecordId) {
        self.history_id = Some(history_id);
    }

    pub(crate) fn record_outcome(&mut self, outcome: ArchivalOutcome) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn record_error(&mut self, error: ReplaceError) {
        self.error = Some(error);
    }
}
