//! Write-time versioning for mutable entities.
//!
//! Whenever an existing entity is updated, the row it had in storage just
//! before the update is archived to a parallel history table, and the entity
//! is pointed at that history row. Update paths do nothing special: they
//! write through a [`ReplaceableModel`] and get the archival for free.
//!
//! # Architecture
//!
//! ```text
//! update(entity)
//!     |
//!     +-- capture      read persisted row by id --> Snapshot
//!     +-- primary write (storage engine)
//!     +-- after_save   Snapshot --> history row (ReplacedInvoice)
//!             |
//!             +-- back-link write  entity.replaced_id = history id
//!                     |
//!                     +-- after_save (suppressed: cycle is linking)
//! ```
//!
//! The primary write is authoritative. If archival or linking fails, the
//! update still stands and the failure is reported on the [`UpdateCycle`]:
//! [`UpdateCycle::is_ready`], [`UpdateCycle::is_success`], and the
//! [`Diagnostics`] messages.
//!
//! # Modules
//!
//! - [`config`] -- Per-entity settings and YAML configuration loading
//! - [`names`] -- Table and field names derived from an entity alias
//! - [`snapshot`] -- The typed pre-write snapshot and its history transform
//! - [`capture`] -- Snapshot Capturer
//! - [`coordinator`] -- Replacement Coordinator (archive and back-link)
//! - [`behavior`] -- The capture and post-write stages for one entity type
//! - [`model`] -- The write pipeline wrapping a storage engine
//! - [`cycle`] -- The cycle-scoped context object and outcomes
//! - [`diagnostics`] -- Status messages keyed by severity
//! - [`error`] -- Recovered error taxonomy
//!
//! # Usage
//!
//! ```
//! use supersede_core::{Replaceable, ReplaceableModel, ReplaceableSettings};
//! use supersede_db::{MemoryStore, RecordStore};
//! use supersede_types::{Entity, FieldMap, RecordId};
//!
//! let mut store = MemoryStore::new();
//! let mut row = FieldMap::new();
//! row.insert("id".to_owned(), 42.into());
//! row.insert("total".to_owned(), 100.into());
//! store.save("Invoice", row).ok();
//!
//! let settings = ReplaceableSettings::new("replaced_id");
//! let mut invoices = ReplaceableModel::new(store, Replaceable::new("Invoice", settings));
//!
//! let mut invoice = Entity::with_id(RecordId::Serial(42)).set("total", 150);
//! let cycle = invoices.update(&mut invoice).ok();
//!
//! assert!(cycle.is_some_and(|c| c.is_success()));
//! assert_eq!(invoices.store().row_count("ReplacedInvoice"), 1);
//! ```

pub mod behavior;
pub mod capture;
pub mod config;
pub mod coordinator;
pub mod cycle;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod names;
pub mod snapshot;

// Re-export primary types at crate root.
pub use behavior::Replaceable;
pub use capture::capture;
pub use config::{ConfigError, ReplaceableSettings, VersioningConfig};
pub use coordinator::{EntityWrites, archive_and_link};
pub use cycle::{ArchivalOutcome, UpdateCycle};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ReplaceError;
pub use model::ReplaceableModel;
pub use names::ModelNames;
pub use snapshot::{FieldClash, RenameTable, Snapshot};
