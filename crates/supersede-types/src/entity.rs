//! The caller's live handle on an entity.
//!
//! An [`Entity`] is what an update path holds in memory: the identity (once
//! assigned) and the pending field values it intends to write. It is not the
//! persisted row; the versioning layer reads that separately so the
//! pre-write state is never confused with pending changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{FieldMap, ID_FIELD};
use crate::ids::RecordId;

/// A live entity with pending, not yet persisted, field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity, if the entity has been persisted before.
    pub id: Option<RecordId>,
    /// Pending field values.
    pub data: FieldMap,
}

impl Entity {
    /// Create an entity with no identity and no pending values.
    pub const fn new() -> Self {
        Self {
            id: None,
            data: FieldMap::new(),
        }
    }

    /// Create a handle on an existing entity.
    pub const fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            data: FieldMap::new(),
        }
    }

    /// Builder-style [`Entity::set_field`].
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(field, value);
        self
    }

    /// Stage a pending value for a field.
    pub fn set_field(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }

    /// Read a pending value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// The field map a storage engine should write for this entity: the
    /// pending values plus the identity, when there is one.
    pub fn write_fields(&self) -> FieldMap {
        let mut fields = self.data.clone();
        if let Some(id) = &self.id {
            fields.insert(ID_FIELD.to_owned(), id.to_value());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_entity_has_no_identity() {
        let entity = Entity::new().set("total", 100);
        assert!(entity.id.is_none());
        assert_eq!(entity.write_fields().get(ID_FIELD), None);
    }

    #[test]
    fn write_fields_carry_identity() {
        let entity = Entity::with_id(RecordId::Serial(42)).set("total", 150);
        let fields = entity.write_fields();
        assert_eq!(fields.get(ID_FIELD), Some(&json!(42)));
        assert_eq!(fields.get("total"), Some(&json!(150)));
        // Pending data itself is untouched.
        assert_eq!(entity.data.get(ID_FIELD), None);
    }
}
