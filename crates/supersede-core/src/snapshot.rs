//! The pre-write snapshot and its transform into a history row.
//!
//! A [`Snapshot`] is built from the row exactly as the storage engine holds
//! it before the pending write lands. It separates the identity and the two
//! engine-maintained timestamps from the business fields, so turning it into
//! a history row is a plain function of the snapshot, the timestamp names,
//! and a [`RenameTable`].

use serde_json::Value;

use supersede_types::{FieldMap, ID_FIELD, RecordId, TimestampFields};

/// Where the original timestamps go on a history row.
///
/// `None` keeps a timestamp under its original name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    /// Alias for the original creation timestamp.
    pub created: Option<String>,
    /// Alias for the original modification timestamp.
    pub modified: Option<String>,
}

impl RenameTable {
    /// Check that no alias lands on a name the history row already uses:
    /// the identity, the back-reference, the other timestamp, or the other
    /// alias. An alias equal to its own timestamp name is a no-op rename.
    pub fn check(
        &self,
        timestamps: &TimestampFields,
        back_reference: &str,
    ) -> Result<(), FieldClash> {
        let aliases = [
            (self.created.as_deref(), timestamps.modified.as_str()),
            (self.modified.as_deref(), timestamps.created.as_str()),
        ];
        for (alias, other_timestamp) in aliases {
            let Some(alias) = alias else {
                continue;
            };
            let overwrites = if alias == ID_FIELD {
                Some("the identity field")
            } else if alias == back_reference {
                Some("the back-reference")
            } else if alias == other_timestamp {
                Some("the other timestamp")
            } else {
                None
            };
            if let Some(overwrites) = overwrites {
                return Err(FieldClash::new(alias, overwrites));
            }
        }
        match (&self.created, &self.modified) {
            (Some(created), Some(modified)) if created == modified => {
                Err(FieldClash::new(created, "the other timestamp alias"))
            }
            _ => Ok(()),
        }
    }
}

/// A history row name that would overwrite a value already on the row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("history field {field} would overwrite {overwrites}")]
pub struct FieldClash {
    /// The name being written.
    pub field: String,
    /// What already occupies that name.
    pub overwrites: String,
}

impl FieldClash {
    fn new(field: &str, overwrites: &str) -> Self {
        Self {
            field: field.to_owned(),
            overwrites: overwrites.to_owned(),
        }
    }
}

/// Read-only copy of an entity's persisted state just before a write.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    id: RecordId,
    created: Option<Value>,
    modified: Option<Value>,
    fields: FieldMap,
}

impl Snapshot {
    /// Split a persisted row into identity, timestamps, and business fields.
    ///
    /// `looked_up` is the identity the row was read by. It is used when the
    /// row's own `id` field is absent or unreadable. Missing timestamps stay
    /// missing.
    pub fn from_row(mut row: FieldMap, looked_up: &RecordId, timestamps: &TimestampFields) -> Self {
        let id = row
            .remove(ID_FIELD)
            .and_then(|value| RecordId::from_value(&value))
            .unwrap_or_else(|| looked_up.clone());
        let created = row.remove(&timestamps.created);
        let modified = row.remove(&timestamps.modified);
        Self {
            id,
            created,
            modified,
            fields: row,
        }
    }

    /// Identity of the snapshotted entity.
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Original creation timestamp, if the row had one.
    pub const fn created(&self) -> Option<&Value> {
        self.created.as_ref()
    }

    /// Original modification timestamp, if the row had one.
    pub const fn modified(&self) -> Option<&Value> {
        self.modified.as_ref()
    }

    /// Business fields (everything but identity and timestamps).
    pub const fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Check that turning this snapshot into a history row loses nothing.
    ///
    /// Fails if the renames clash (see [`RenameTable::check`]), or if a
    /// timestamp alias or the back-reference names an existing business
    /// field.
    pub fn check_history_fields(
        &self,
        timestamps: &TimestampFields,
        renames: &RenameTable,
        back_reference: &str,
    ) -> Result<(), FieldClash> {
        renames.check(timestamps, back_reference)?;

        let created = self
            .created
            .as_ref()
            .map(|_| renames.created.as_deref().unwrap_or(&timestamps.created));
        let modified = self
            .modified
            .as_ref()
            .map(|_| renames.modified.as_deref().unwrap_or(&timestamps.modified));

        [created, modified, Some(back_reference)]
            .into_iter()
            .flatten()
            .find(|name| self.fields.contains_key(*name))
            .map_or(Ok(()), |name| Err(FieldClash::new(name, "a business field")))
    }

    /// Build the field map of a history row.
    ///
    /// 1. Business fields are copied as-is.
    /// 2. Each timestamp present on the snapshot is written under its alias
    ///    from `renames`, or under its original name when there is no alias.
    /// 3. The identity is dropped and written to `back_reference` instead.
    ///
    /// Nothing is overwritten: a clash is returned instead of a row.
    pub fn into_history_fields(
        self,
        timestamps: &TimestampFields,
        renames: &RenameTable,
        back_reference: &str,
    ) -> Result<FieldMap, FieldClash> {
        self.check_history_fields(timestamps, renames, back_reference)?;

        let mut fields = self.fields;
        if let Some(created) = self.created {
            let name = renames.created.as_deref().unwrap_or(&timestamps.created);
            fields.insert(name.to_owned(), created);
        }
        if let Some(modified) = self.modified {
            let name = renames.modified.as_deref().unwrap_or(&timestamps.modified);
            fields.insert(name.to_owned(), modified);
        }
        fields.insert(back_reference.to_owned(), self.id.to_value());
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: serde_json::Value) -> FieldMap {
        serde_json::from_value(value).unwrap_or_default()
    }

    fn invoice() -> Snapshot {
        Snapshot::from_row(
            row(json!({"id": 42, "total": 100, "createdAt": "2020-01-01", "modifiedAt": "2020-01-05"})),
            &RecordId::Serial(42),
            &TimestampFields::default(),
        )
    }

    #[test]
    fn from_row_splits_reserved_fields() {
        let snapshot = invoice();
        assert_eq!(snapshot.id(), &RecordId::Serial(42));
        assert_eq!(snapshot.created(), Some(&json!("2020-01-01")));
        assert_eq!(snapshot.modified(), Some(&json!("2020-01-05")));
        assert_eq!(snapshot.fields(), &row(json!({"total": 100})));
    }

    #[test]
    fn renamed_created_moves_value() {
        let renames = RenameTable {
            created: Some("original_created".to_owned()),
            modified: None,
        };
        let fields = invoice()
            .into_history_fields(&TimestampFields::default(), &renames, "invoice_id")
            .unwrap_or_default();
        assert_eq!(
            fields,
            row(json!({
                "invoice_id": 42,
                "total": 100,
                "original_created": "2020-01-01",
                "modifiedAt": "2020-01-05"
            }))
        );
    }

    #[test]
    fn both_renames() {
        let renames = RenameTable {
            created: Some("original_created".to_owned()),
            modified: Some("original_modified".to_owned()),
        };
        let fields = invoice()
            .into_history_fields(&TimestampFields::default(), &renames, "invoice_id")
            .unwrap_or_default();
        assert!(!fields.contains_key("createdAt"));
        assert!(!fields.contains_key("modifiedAt"));
        assert!(!fields.contains_key("id"));
        assert_eq!(fields.get("original_modified"), Some(&json!("2020-01-05")));
    }

    #[test]
    fn missing_timestamps_are_not_invented() {
        let snapshot = Snapshot::from_row(
            row(json!({"id": 3})),
            &RecordId::Serial(3),
            &TimestampFields::default(),
        );
        let renames = RenameTable {
            created: Some("original_created".to_owned()),
            modified: None,
        };
        let fields = snapshot
            .into_history_fields(&TimestampFields::default(), &renames, "invoice_id")
            .unwrap_or_default();
        assert_eq!(fields, row(json!({"invoice_id": 3})));
    }

    #[test]
    fn lookup_identity_fills_missing_id() {
        let snapshot = Snapshot::from_row(
            row(json!({"total": 1})),
            &RecordId::Serial(8),
            &TimestampFields::default(),
        );
        assert_eq!(snapshot.id(), &RecordId::Serial(8));
    }

    fn renames(created: Option<&str>, modified: Option<&str>) -> RenameTable {
        RenameTable {
            created: created.map(str::to_owned),
            modified: modified.map(str::to_owned),
        }
    }

    #[test]
    fn created_alias_cannot_take_modified_name() {
        let renames = renames(Some("modifiedAt"), None);
        let result =
            invoice().into_history_fields(&TimestampFields::default(), &renames, "invoice_id");
        assert_eq!(
            result.err().map(|clash| clash.field),
            Some("modifiedAt".to_owned())
        );
    }

    #[test]
    fn aliases_cannot_take_reserved_names() {
        let timestamps = TimestampFields::default();
        for alias in ["id", "invoice_id"] {
            assert!(renames(Some(alias), None).check(&timestamps, "invoice_id").is_err());
            assert!(renames(None, Some(alias)).check(&timestamps, "invoice_id").is_err());
        }
        assert!(
            renames(None, Some("createdAt"))
                .check(&timestamps, "invoice_id")
                .is_err()
        );
    }

    #[test]
    fn aliases_cannot_share_a_name() {
        let clash = renames(Some("archived_at"), Some("archived_at"))
            .check(&TimestampFields::default(), "invoice_id");
        assert_eq!(
            clash.err().map(|clash| clash.overwrites),
            Some("the other timestamp alias".to_owned())
        );
    }

    #[test]
    fn alias_equal_to_own_name_is_allowed() {
        let renames = renames(Some("createdAt"), Some("modifiedAt"));
        assert_eq!(renames.check(&TimestampFields::default(), "invoice_id"), Ok(()));
        let fields = invoice()
            .into_history_fields(&TimestampFields::default(), &renames, "invoice_id")
            .unwrap_or_default();
        assert_eq!(fields.get("createdAt"), Some(&json!("2020-01-01")));
    }

    #[test]
    fn alias_cannot_overwrite_business_field() {
        let renames = renames(Some("total"), None);
        let snapshot = invoice();
        assert_eq!(
            snapshot
                .check_history_fields(&TimestampFields::default(), &renames, "invoice_id")
                .err()
                .map(|clash| clash.field),
            Some("total".to_owned())
        );
        assert!(
            snapshot
                .into_history_fields(&TimestampFields::default(), &renames, "invoice_id")
                .is_err()
        );
    }

    #[test]
    fn back_reference_cannot_overwrite_business_field() {
        let snapshot = Snapshot::from_row(
            row(json!({"id": 42, "invoice_id": 7})),
            &RecordId::Serial(42),
            &TimestampFields::default(),
        );
        let result = snapshot.check_history_fields(
            &TimestampFields::default(),
            &RenameTable::default(),
            "invoice_id",
        );
        assert!(result.is_err());
    }

    #[test]
    fn absent_timestamp_alias_is_not_checked_against_fields() {
        let snapshot = Snapshot::from_row(
            row(json!({"id": 3, "total": 1})),
            &RecordId::Serial(3),
            &TimestampFields::default(),
        );
        let renames = renames(Some("total"), None);
        assert_eq!(
            snapshot.check_history_fields(&TimestampFields::default(), &renames, "invoice_id"),
            Ok(())
        );
    }
}
