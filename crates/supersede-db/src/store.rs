//! The storage trait consumed by the versioning pipeline.

use serde_json::Value;

use supersede_types::{FieldMap, RecordId};

use crate::error::StoreError;

/// A storage engine the versioning pipeline can read from and write to.
///
/// Writes are synchronous and take `&mut self`: one update cycle runs to
/// completion before the next begins, and the engine is responsible for
/// serializing conflicting writes to the same row.
///
/// ## Timestamp Upkeep
///
/// Engines stamp their own creation and modification timestamps. Whatever
/// a caller writes under those names may be replaced by the engine, which is
/// why history rows carry the original timestamps under other names.
pub trait RecordStore {
    /// Read the persisted row for `id`, bypassing any cached or pending view.
    ///
    /// The returned map includes the identity and timestamp fields.
    /// Returns `Ok(None)` when no such row exists.
    fn find_by_id(&self, table: &str, id: &RecordId) -> Result<Option<FieldMap>, StoreError>;

    /// Save a row.
    ///
    /// When `fields` carries an identity that matches an existing row, the
    /// fields are merged into that row. Otherwise a new row is inserted.
    ///
    /// Returns the identity of the written row.
    fn save(&mut self, table: &str, fields: FieldMap) -> Result<RecordId, StoreError>;

    /// Write a single field on an existing row.
    ///
    /// Returns [`StoreError::RowNotFound`] if the row does not exist, and
    /// [`StoreError::InvalidIdentity`] if `field` is the identity field.
    fn save_field(
        &mut self,
        table: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}
