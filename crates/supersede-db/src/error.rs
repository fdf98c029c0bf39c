//! Error types for the storage seam.
//!
//! Every [`RecordStore`](crate::RecordStore) implementation reports failures
//! through [`StoreError`], which names the table and, where relevant, the
//! row involved.

use supersede_types::RecordId;

/// Errors that can occur in a storage engine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The table does not accept writes.
    #[error("table {table} is read-only")]
    ReadOnly {
        /// The table that rejected the write.
        table: String,
    },

    /// A single-field write targeted a row that does not exist.
    #[error("row not found: {table}/{id}")]
    RowNotFound {
        /// The table searched.
        table: String,
        /// The missing identity.
        id: RecordId,
    },

    /// The `id` field of a saved row is not a usable identity, or a
    /// single-field write tried to replace it.
    #[error("invalid identity value: {0}")]
    InvalidIdentity(String),

    /// The serial identity counter cannot advance any further.
    #[error("identity space exhausted for table {table}")]
    IdentityExhausted {
        /// The table whose counter overflowed.
        table: String,
    },
}
