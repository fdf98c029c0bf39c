//! Error types for the versioning pipeline.
//!
//! Every variant of [`ReplaceError`] is recovered locally: the pipeline
//! records it on the [`UpdateCycle`](crate::UpdateCycle) instead of failing
//! the primary write. Callers that want an error value can ask the cycle for
//! one with [`UpdateCycle::into_result`](crate::UpdateCycle::into_result).

use supersede_db::StoreError;
use supersede_types::RecordId;

/// Reasons an update cycle did not archive and link its snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// The settings cannot archive the entity without losing a value: the
    /// history row field is missing or reserved, or a history row name
    /// would overwrite another field.
    #[error("replaceable settings for {entity} are invalid: {reason}")]
    Configuration {
        /// The entity type alias.
        entity: String,
        /// What is wrong, phrased for a caller.
        reason: String,
    },

    /// Capture was attempted on an entity that has never been persisted.
    #[error("{entity} has no identity; only existing rows can be replaced")]
    IdentityMissing {
        /// The entity type alias.
        entity: String,
    },

    /// No persisted row exists for the entity's identity.
    #[error("no persisted {entity} row with id {id}")]
    NotFound {
        /// The entity type alias.
        entity: String,
        /// The identity that was looked up.
        id: RecordId,
    },

    /// The persisted row exists or may exist, but storage failed to read it.
    #[error("persisted {entity} row {id} could not be read: {source}")]
    Unreadable {
        /// The entity type alias.
        entity: String,
        /// The identity that was looked up.
        id: RecordId,
        /// The storage failure.
        source: StoreError,
    },

    /// The history row could not be written.
    #[error("audit data for {entity} {id} could not be saved: {source}")]
    Persistence {
        /// The entity type alias.
        entity: String,
        /// The entity whose snapshot was being archived.
        id: RecordId,
        /// The storage failure.
        source: StoreError,
    },

    /// The history row was written but the entity could not be pointed at it.
    #[error("audit row {history_id} could not be linked to {entity} {id}: {source}")]
    Link {
        /// The entity type alias.
        entity: String,
        /// The entity that should have been linked.
        id: RecordId,
        /// The history row that was written.
        history_id: RecordId,
        /// The storage failure.
        source: StoreError,
    },

    /// The cycle never reached the archive-and-link stage.
    #[error("update cycle for {entity} has not archived its snapshot")]
    Incomplete {
        /// The entity type alias.
        entity: String,
    },
}
