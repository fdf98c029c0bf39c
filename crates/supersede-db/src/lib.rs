//! Storage seam for write-time versioning.
//!
//! The versioning pipeline never talks to a database directly. It consumes
//! the narrow [`RecordStore`] trait: a direct row read by identity, a
//! whole-row save, and a single-field save. Engines are expected to maintain
//! the creation and modification timestamps themselves.
//!
//! # Architecture
//!
//! ```text
//! ReplaceableModel (supersede-core)
//!     |
//!     +-- find_by_id  --> current persisted row (pre-write snapshot)
//!     +-- save        --> primary write / new history row
//!     +-- save_field  --> history back-link
//!             |
//!         RecordStore
//!             +-- MemoryStore (in-process engine)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`RecordStore`] trait
//! - [`memory`] -- [`MemoryStore`], an in-memory engine with timestamp upkeep
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::RecordStore;
