//! Snapshot Capturer.
//!
//! Reads the entity's persisted row directly from storage, by identity,
//! before the pending write is applied. The in-memory [`Entity`] data is
//! deliberately ignored: it holds what the caller is about to write, and it
//! may also carry stale or overwritten timestamps.
//!
//! [`Entity`]: supersede_types::Entity

use tracing::{debug, warn};

use supersede_db::RecordStore;
use supersede_types::{RecordId, TimestampFields};

use crate::config::ReplaceableSettings;
use crate::error::ReplaceError;
use crate::names::ModelNames;
use crate::snapshot::Snapshot;

/// Capture the persisted state of the entity identified by `id`.
///
/// # Errors
///
/// - [`ReplaceError::Configuration`] if the settings fail
///   [`ReplaceableSettings::validate`], or the captured row could not be
///   archived without overwriting one of its fields.
/// - [`ReplaceError::IdentityMissing`] if `id` is `None` (a new entity).
/// - [`ReplaceError::NotFound`] if storage has no row for `id`.
/// - [`ReplaceError::Unreadable`] if storage failed to read the row.
pub fn capture<S: RecordStore + ?Sized>(
    store: &S,
    names: &ModelNames,
    settings: &ReplaceableSettings,
    timestamps: &TimestampFields,
    id: Option<&RecordId>,
) -> Result<Snapshot, ReplaceError> {
    let entity = names.alias();
    settings.validate(names, timestamps)?;

    let id = id.ok_or_else(|| ReplaceError::IdentityMissing {
        entity: entity.to_owned(),
    })?;

    let row = match store.find_by_id(entity, id) {
        Ok(Some(row)) => row,
        Ok(None) => {
            return Err(ReplaceError::NotFound {
                entity: entity.to_owned(),
                id: id.clone(),
            });
        }
        Err(source) => {
            warn!(entity, %id, error = %source, "Failed to read persisted row for snapshot");
            return Err(ReplaceError::Unreadable {
                entity: entity.to_owned(),
                id: id.clone(),
                source,
            });
        }
    };

    debug!(entity, %id, fields = row.len(), "Captured persisted row");
    let snapshot = Snapshot::from_row(row, id, timestamps);
    snapshot
        .check_history_fields(timestamps, &settings.rename_table(), names.back_reference())
        .map_err(|clash| ReplaceError::Configuration {
            entity: entity.to_owned(),
            reason: format!("{entity} {id} cannot be archived: {clash}"),
        })?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use supersede_db::{MemoryStore, StoreError};
    use supersede_types::FieldMap;

    use super::*;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        let row: FieldMap = serde_json::from_value(json!({
            "id": 42, "total": 100, "createdAt": "2020-01-01", "modifiedAt": "2020-01-05"
        }))
        .unwrap_or_default();
        let _ = store.save("Invoice", row);
        store
    }

    fn settings() -> ReplaceableSettings {
        ReplaceableSettings::new("replaced_id")
    }

    #[test]
    fn captures_persisted_row() {
        let store = seeded();
        let snapshot = capture(
            &store,
            &ModelNames::new("Invoice"),
            &settings(),
            &TimestampFields::default(),
            Some(&RecordId::Serial(42)),
        );
        let snapshot = snapshot.ok();
        assert_eq!(snapshot.as_ref().map(Snapshot::id), Some(&RecordId::Serial(42)));
        assert_eq!(
            snapshot.as_ref().and_then(Snapshot::created),
            Some(&json!("2020-01-01"))
        );
        assert_eq!(
            snapshot.as_ref().and_then(|s| s.fields().get("total")),
            Some(&json!(100))
        );
    }

    #[test]
    fn configuration_is_checked_first() {
        let store = seeded();
        let result = capture(
            &store,
            &ModelNames::new("Invoice"),
            &ReplaceableSettings::default(),
            &TimestampFields::default(),
            None,
        );
        assert!(matches!(result, Err(ReplaceError::Configuration { .. })));
    }

    #[test]
    fn missing_identity_is_rejected() {
        let store = seeded();
        let result = capture(
            &store,
            &ModelNames::new("Invoice"),
            &settings(),
            &TimestampFields::default(),
            None,
        );
        assert!(matches!(result, Err(ReplaceError::IdentityMissing { .. })));
    }

    #[test]
    fn vanished_row_is_not_found() {
        let store = seeded();
        let result = capture(
            &store,
            &ModelNames::new("Invoice"),
            &settings(),
            &TimestampFields::default(),
            Some(&RecordId::Serial(7)),
        );
        assert!(matches!(
            result,
            Err(ReplaceError::NotFound { id: RecordId::Serial(7), .. })
        ));
    }

    #[test]
    fn reserved_history_row_field_is_rejected_before_reading() {
        let store = seeded();
        let result = capture(
            &store,
            &ModelNames::new("Invoice"),
            &ReplaceableSettings::new("id"),
            &TimestampFields::default(),
            Some(&RecordId::Serial(42)),
        );
        assert!(matches!(result, Err(ReplaceError::Configuration { .. })));
    }

    #[test]
    fn alias_over_business_field_is_rejected() {
        let store = seeded();
        let result = capture(
            &store,
            &ModelNames::new("Invoice"),
            &ReplaceableSettings::new("replaced_id").with_created_alias("total"),
            &TimestampFields::default(),
            Some(&RecordId::Serial(42)),
        );
        let reason = match result {
            Err(ReplaceError::Configuration { reason, .. }) => reason,
            other => format!("{other:?}"),
        };
        assert_eq!(
            reason,
            "Invoice 42 cannot be archived: history field total would overwrite a business field"
        );
    }

    /// A store whose reads always fail.
    struct Unreadable;

    impl RecordStore for Unreadable {
        fn find_by_id(&self, table: &str, _id: &RecordId) -> Result<Option<FieldMap>, StoreError> {
            Err(StoreError::ReadOnly {
                table: table.to_owned(),
            })
        }

        fn save(&mut self, table: &str, _fields: FieldMap) -> Result<RecordId, StoreError> {
            Err(StoreError::ReadOnly {
                table: table.to_owned(),
            })
        }

        fn save_field(
            &mut self,
            table: &str,
            _id: &RecordId,
            _field: &str,
            _value: serde_json::Value,
        ) -> Result<(), StoreError> {
            Err(StoreError::ReadOnly {
                table: table.to_owned(),
            })
        }
    }

    #[test]
    fn read_failure_keeps_its_source() {
        let result = capture(
            &Unreadable,
            &ModelNames::new("Invoice"),
            &settings(),
            &TimestampFields::default(),
            Some(&RecordId::Serial(42)),
        );
        assert!(matches!(
            result,
            Err(ReplaceError::Unreadable {
                source: StoreError::ReadOnly { .. },
                ..
            })
        ));
    }
}
