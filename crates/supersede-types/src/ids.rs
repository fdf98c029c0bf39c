//! Opaque record identities.
//!
//! Storage engines hand out either serial integers (auto-increment style) or
//! UUIDs. [`RecordId`] covers both so the versioning layer never needs to
//! know which one a given table uses. Identities travel inside field maps as
//! JSON values, so the conversions to and from [`Value`] live here as well.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identity of a stored row.
///
/// Serializes untagged: a serial id is a JSON number, a UUID is a JSON
/// string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Storage-assigned serial number.
    Serial(i64),
    /// UUID identity.
    Uuid(Uuid),
}

/// A string could not be interpreted as a [`RecordId`].
#[derive(Debug, thiserror::Error)]
#[error("invalid record id {input:?}: {source}")]
pub struct ParseRecordIdError {
    /// The rejected input.
    pub input: String,
    /// Why the input is not a UUID either.
    pub source: uuid::Error,
}

impl RecordId {
    /// Create a new UUID identity (v7, time-ordered).
    pub fn new_uuid() -> Self {
        Self::Uuid(Uuid::now_v7())
    }

    /// Encode the identity as it is stored inside a field map.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Serial(n) => Value::from(*n),
            Self::Uuid(id) => Value::String(id.to_string()),
        }
    }

    /// Decode an identity from a field-map value.
    ///
    /// Integers become serial ids. Strings are parsed as an integer first,
    /// then as a UUID. Anything else is not an identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Serial),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Self::Serial(n));
        }
        match Uuid::parse_str(s) {
            Ok(id) => Ok(Self::Uuid(id)),
            Err(source) => Err(ParseRecordIdError {
                input: s.to_owned(),
                source,
            }),
        }
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Serial(n) => write!(f, "{n}"),
            Self::Uuid(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Serial(n)
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serial_value_roundtrip() {
        let id = RecordId::Serial(42);
        assert_eq!(id.to_value(), json!(42));
        assert_eq!(RecordId::from_value(&json!(42)), Some(id));
    }

    #[test]
    fn numeric_strings_are_serial() {
        assert_eq!(
            RecordId::from_value(&json!("42")),
            Some(RecordId::Serial(42))
        );
    }

    #[test]
    fn uuid_strings_are_uuids() {
        let id = RecordId::new_uuid();
        let decoded = RecordId::from_value(&id.to_value());
        assert_eq!(decoded, Some(id));
    }

    #[test]
    fn non_identities_are_rejected() {
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!(1.5)), None);
        assert_eq!(RecordId::from_value(&json!("not-an-id")), None);
        assert!("not-an-id".parse::<RecordId>().is_err());
    }

    #[test]
    fn display_is_bare_value() {
        assert_eq!(RecordId::Serial(7).to_string(), "7");
        let id = RecordId::new_uuid();
        if let RecordId::Uuid(inner) = &id {
            assert_eq!(id.to_string(), inner.to_string());
        }
    }

    #[test]
    fn serde_is_untagged() {
        let json = serde_json::to_string(&RecordId::Serial(3)).ok();
        assert_eq!(json.as_deref(), Some("3"));
        let restored: Result<RecordId, _> = serde_json::from_str("3");
        assert!(matches!(restored, Ok(RecordId::Serial(3))));
    }
}
