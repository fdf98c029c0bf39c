//! In-memory storage engine.
//!
//! [`MemoryStore`] keeps every table as an ordered map from identity to row.
//! It behaves like a small relational engine as far as the versioning
//! pipeline can observe:
//!
//! - **Identity assignment**: rows saved without an `id` get the next serial
//!   number for their table, starting at 1.
//! - **Timestamp upkeep**: inserts stamp the creation and modification
//!   fields, updates stamp the modification field. A non-blank value the
//!   caller supplies under those names is kept instead.
//! - **Read-only tables**: a table can refuse writes, which is how callers
//!   exercise storage failures without a real database.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use supersede_types::{FieldMap, ID_FIELD, RecordId, TimestampFields, is_blank};

use crate::error::StoreError;
use crate::store::RecordStore;

/// Source of the current time for timestamp upkeep.
pub type Clock = fn() -> DateTime<Utc>;

/// A single table: rows plus the serial counter.
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, FieldMap>,
    last_serial: i64,
    read_only: bool,
}

impl Table {
    /// Allocate the next serial identity.
    fn next_serial(&mut self, table: &str) -> Result<RecordId, StoreError> {
        self.last_serial = self
            .last_serial
            .checked_add(1)
            .ok_or_else(|| StoreError::IdentityExhausted {
                table: table.to_owned(),
            })?;
        Ok(RecordId::Serial(self.last_serial))
    }

    /// Keep the counter ahead of explicitly supplied serial identities.
    const fn observe(&mut self, id: &RecordId) {
        if let RecordId::Serial(n) = id {
            if *n > self.last_serial {
                self.last_serial = *n;
            }
        }
    }
}

/// An in-process [`RecordStore`].
#[derive(Debug)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
    timestamps: TimestampFields,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store using the default timestamp field names.
    pub fn new() -> Self {
        Self::with_timestamps(TimestampFields::default())
    }

    /// Create an empty store that maintains the given timestamp fields.
    pub fn with_timestamps(timestamps: TimestampFields) -> Self {
        Self {
            tables: BTreeMap::new(),
            timestamps,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for timestamp upkeep.
    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The timestamp fields this store maintains.
    pub const fn timestamps(&self) -> &TimestampFields {
        &self.timestamps
    }

    /// Mark a table as read-only (or writable again).
    pub fn set_read_only(&mut self, table: &str, read_only: bool) {
        self.tables.entry(table.to_owned()).or_default().read_only = read_only;
        debug!(table, read_only, "Table write mode changed");
    }

    /// Number of rows in a table. Unknown tables are empty.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// All rows of a table in identity order.
    pub fn rows(&self, table: &str) -> Vec<&FieldMap> {
        self.tables
            .get(table)
            .map(|t| t.rows.values().collect())
            .unwrap_or_default()
    }

    /// The current time, formatted the way timestamps are stored.
    fn now(&self) -> Value {
        Value::String((self.clock)().to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Look up (or create) a table and refuse it if it is read-only.
    fn writable_table(&mut self, table: &str) -> Result<&mut Table, StoreError> {
        let slot = self.tables.entry(table.to_owned()).or_default();
        if slot.read_only {
            warn!(table, "Rejected write to read-only table");
            return Err(StoreError::ReadOnly {
                table: table.to_owned(),
            });
        }
        Ok(slot)
    }
}

/// Stamp `field` with `now` unless the caller supplied a real value.
fn stamp(fields: &mut FieldMap, field: &str, now: &Value) {
    if fields.get(field).is_none_or(is_blank) {
        fields.insert(field.to_owned(), now.clone());
    }
}

impl RecordStore for MemoryStore {
    fn find_by_id(&self, table: &str, id: &RecordId) -> Result<Option<FieldMap>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.rows.get(id))
            .cloned())
    }

    fn save(&mut self, table: &str, mut fields: FieldMap) -> Result<RecordId, StoreError> {
        let now = self.now();
        let timestamps = self.timestamps.clone();

        let requested = match fields.remove(ID_FIELD) {
            Some(value) => Some(
                RecordId::from_value(&value)
                    .ok_or_else(|| StoreError::InvalidIdentity(value.to_string()))?,
            ),
            None => None,
        };

        let slot = self.writable_table(table)?;

        if let Some(id) = &requested {
            if let Some(row) = slot.rows.get_mut(id) {
                stamp(&mut fields, &timestamps.modified, &now);
                row.extend(fields);
                debug!(table, %id, "Updated row");
                return Ok(id.clone());
            }
        }

        let id = match requested {
            Some(id) => {
                slot.observe(&id);
                id
            }
            None => slot.next_serial(table)?,
        };

        stamp(&mut fields, &timestamps.created, &now);
        stamp(&mut fields, &timestamps.modified, &now);
        fields.insert(ID_FIELD.to_owned(), id.to_value());
        slot.rows.insert(id.clone(), fields);

        debug!(table, %id, "Inserted row");
        Ok(id)
    }

    fn save_field(
        &mut self,
        table: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        if field == ID_FIELD {
            return Err(StoreError::InvalidIdentity(format!(
                "{table}/{id}: {ID_FIELD} is assigned on insert and cannot be rewritten"
            )));
        }
        let now = self.now();
        let modified = self.timestamps.modified.clone();

        let slot = self.writable_table(table)?;
        let row = slot
            .rows
            .get_mut(id)
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_owned(),
                id: id.clone(),
            })?;

        row.insert(field.to_owned(), value);
        if field != modified {
            row.insert(modified, now);
        }

        debug!(table, %id, field, "Saved single field");
        Ok(())
    }
}
