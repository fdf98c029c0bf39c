//! The write pipeline for one replaceable entity type.
//!
//! [`ReplaceableModel`] sits between an update path and the storage engine.
//! Every write it performs on the entity table fires the post-write stage,
//! including the coordinator's back-link write; the cycle's `linking` flag
//! is what keeps that from recursing.

use serde_json::Value;
use tracing::{debug, info};

use supersede_db::{RecordStore, StoreError};
use supersede_types::{Entity, FieldMap, RecordId};

use crate::behavior::Replaceable;
use crate::config::{ConfigError, VersioningConfig};
use crate::coordinator::EntityWrites;
use crate::cycle::{ArchivalOutcome, UpdateCycle};

/// A storage engine wrapped with write-time versioning for one entity type.
#[derive(Debug)]
pub struct ReplaceableModel<S> {
    store: S,
    replaceable: Replaceable,
}

impl<S: RecordStore> ReplaceableModel<S> {
    /// Wrap `store` with the given versioning behavior.
    pub const fn new(store: S, replaceable: Replaceable) -> Self {
        Self { store, replaceable }
    }

    /// Wrap `store` with the versioning declared for `alias` in `config`.
    pub fn from_config(
        store: S,
        alias: &str,
        config: &VersioningConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(store, Replaceable::from_config(alias, config)?))
    }

    /// The versioning behavior.
    pub const fn replaceable(&self) -> &Replaceable {
        &self.replaceable
    }

    /// The wrapped storage engine.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the storage engine. Writes made here bypass the
    /// pipeline.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwrap the storage engine.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Update an existing entity, archiving the version it replaces.
    ///
    /// Runs capture, the primary write, and the post-write stage. Only a
    /// failure of the primary write is returned as an error; archival and
    /// link failures are reported on the returned cycle.
    pub fn update(&mut self, entity: &mut Entity) -> Result<UpdateCycle, StoreError> {
        let mut cycle = self.begin(entity);
        let id = self.save(&mut cycle, entity)?;
        info!(
            entity = self.replaceable.names().alias(),
            %id,
            archived = cycle.is_success(),
            "Entity updated"
        );
        Ok(cycle)
    }

    /// Capture stage on its own.
    pub fn begin(&self, entity: &Entity) -> UpdateCycle {
        self.replaceable.setup(&self.store, entity)
    }

    /// Primary write followed by the post-write stage.
    ///
    /// The entity's identity is updated to whatever the engine assigned.
    /// If the write fails, the post-write stage does not run and the
    /// cycle's snapshot is left unconsumed.
    pub fn save(
        &mut self,
        cycle: &mut UpdateCycle,
        entity: &mut Entity,
    ) -> Result<RecordId, StoreError> {
        let alias = self.replaceable.names().alias();
        let id = match self.store.save(alias, entity.write_fields()) {
            Ok(id) => id,
            Err(e) => {
                debug!(entity = alias, error = %e, "Primary write failed, skipping archival");
                return Err(e);
            }
        };
        entity.id = Some(id.clone());
        self.after_save(cycle, entity);
        Ok(id)
    }

    /// Post-write stage on its own.
    pub fn after_save(&mut self, cycle: &mut UpdateCycle, entity: &mut Entity) -> ArchivalOutcome {
        let mut writer = HookedWriter {
            store: &mut self.store,
            replaceable: &self.replaceable,
        };
        self.replaceable.after_save(&mut writer, cycle, entity)
    }
}

/// Routes coordinator writes to the engine and fires the post-write stage
/// for writes to the entity table.
struct HookedWriter<'a, S> {
    store: &'a mut S,
    replaceable: &'a Replaceable,
}

impl<S: RecordStore> EntityWrites for HookedWriter<'_, S> {
    fn insert_history(&mut self, table: &str, fields: FieldMap) -> Result<RecordId, StoreError> {
        self.store.save(table, fields)
    }

    fn save_field(
        &mut self,
        cycle: &mut UpdateCycle,
        entity: &mut Entity,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let replaceable = self.replaceable;
        entity.data = FieldMap::from([(field.to_owned(), value.clone())]);
        self.store
            .save_field(replaceable.names().alias(), id, field, value)?;

        let outcome = replaceable.after_save(self, cycle, entity);
        debug!(entity = replaceable.names().alias(), ?outcome, "Post-write stage ran for single-field write");
        Ok(())
    }
}
