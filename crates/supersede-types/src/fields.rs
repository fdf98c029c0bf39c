//! Field maps and the field names the storage engine reserves.
//!
//! Rows are untyped maps from field name to JSON value. The identity lives
//! under [`ID_FIELD`]; the engine stamps the two fields named by
//! [`TimestampFields`] on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row's fields, ordered by name.
pub type FieldMap = BTreeMap<String, Value>;

/// Name of the identity field on every row.
pub const ID_FIELD: &str = "id";

/// Default name of the engine-maintained creation timestamp.
pub const DEFAULT_CREATED_FIELD: &str = "createdAt";

/// Default name of the engine-maintained modification timestamp.
pub const DEFAULT_MODIFIED_FIELD: &str = "modifiedAt";

/// Names of the timestamp fields a storage engine maintains automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampFields {
    /// Field stamped when a row is inserted.
    #[serde(default = "default_created")]
    pub created: String,
    /// Field stamped on every write.
    #[serde(default = "default_modified")]
    pub modified: String,
}

impl Default for TimestampFields {
    fn default() -> Self {
        Self {
            created: default_created(),
            modified: default_modified(),
        }
    }
}

fn default_created() -> String {
    DEFAULT_CREATED_FIELD.to_owned()
}

fn default_modified() -> String {
    DEFAULT_MODIFIED_FIELD.to_owned()
}

/// Whether a value counts as "not supplied" for timestamp maintenance.
///
/// `null` and the empty string are blank; everything else is a real value.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_timestamp_names() {
        let names = TimestampFields::default();
        assert_eq!(names.created, "createdAt");
        assert_eq!(names.modified, "modifiedAt");
    }

    #[test]
    fn partial_timestamp_names_fill_defaults() {
        let names: Result<TimestampFields, _> = serde_json::from_value(json!({"created": "created"}));
        let names = names.ok();
        assert_eq!(names.as_ref().map(|n| n.created.as_str()), Some("created"));
        assert_eq!(names.as_ref().map(|n| n.modified.as_str()), Some("modifiedAt"));
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!("2020-01-01")));
        assert!(!is_blank(&json!(0)));
    }
}
