//! Shared type definitions for write-time versioning.
//!
//! This crate is the vocabulary shared by the storage seam
//! (`supersede-db`) and the versioning pipeline (`supersede-core`): record
//! identities, field maps, the caller's live entity handle, and the names of
//! the timestamp fields a storage engine maintains on its own.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque record identities (serial or UUID)
//! - [`fields`] -- Field maps, reserved field names, timestamp field names
//! - [`entity`] -- The live entity handle carrying pending changes

pub mod entity;
pub mod fields;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use entity::Entity;
pub use fields::{
    DEFAULT_CREATED_FIELD, DEFAULT_MODIFIED_FIELD, FieldMap, ID_FIELD, TimestampFields, is_blank,
};
pub use ids::{ParseRecordIdError, RecordId};
