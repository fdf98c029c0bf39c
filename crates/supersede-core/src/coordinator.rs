//! Replacement Coordinator.
//!
//! Runs after a primary write has committed. It consumes the cycle's
//! snapshot, writes it to the history table, and points the entity at the
//! new history row through the configured history row field.
//!
//! The back-link is itself a write to the entity, so it is issued with the
//! cycle's `linking` flag raised. Any post-write stage that fires while the
//! flag is up is suppressed (see [`Replaceable::after_save`]).
//!
//! Failures here never undo the primary write. They are recorded on the
//! cycle as an error diagnostic and a [`ReplaceError`].
//!
//! [`Replaceable::after_save`]: crate::Replaceable::after_save

use serde_json::Value;
use tracing::{debug, warn};

use supersede_db::StoreError;
use supersede_types::{Entity, FieldMap, RecordId};

use crate::behavior::Replaceable;
use crate::cycle::{ArchivalOutcome, UpdateCycle};
use crate::error::ReplaceError;

/// The writes the coordinator issues.
///
/// `save_field` is a write to the entity and must behave like one: it
/// replaces the entity's pending data with the written field and fires the
/// post-write stage, which sees the cycle's `linking` flag and stands down.
pub trait EntityWrites {
    /// Insert a new history row and return its identity.
    fn insert_history(&mut self, table: &str, fields: FieldMap) -> Result<RecordId, StoreError>;

    /// Write one field of the entity identified by `id`.
    fn save_field(
        &mut self,
        cycle: &mut UpdateCycle,
        entity: &mut Entity,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}

/// Archive the cycle's snapshot and link the entity to the history row.
///
/// Consumes the snapshot; a second call in the same cycle returns
/// [`ArchivalOutcome::AlreadyArchived`].
pub fn archive_and_link<W: EntityWrites + ?Sized>(
    writer: &mut W,
    replaceable: &Replaceable,
    cycle: &mut UpdateCycle,
    entity: &mut Entity,
) -> ArchivalOutcome {
    let names = replaceable.names();
    let alias = names.alias();

    let Some((snapshot, link_field)) = cycle.take_capture() else {
        debug!(entity = alias, "Snapshot already archived in this cycle");
        return ArchivalOutcome::AlreadyArchived;
    };

    let id = snapshot.id().clone();
    let fields = match snapshot.into_history_fields(
        replaceable.timestamps(),
        &replaceable.settings().rename_table(),
        names.back_reference(),
    ) {
        Ok(fields) => fields,
        Err(clash) => {
            warn!(entity = alias, %id, error = %clash, "Snapshot cannot become a history row");
            cycle.diagnostics_mut().error(
                alias,
                format!("The {} was not saved: {clash}", names.humanized()),
            );
            cycle.record_error(ReplaceError::Configuration {
                entity: alias.to_owned(),
                reason: clash.to_string(),
            });
            return ArchivalOutcome::ArchiveFailed;
        }
    };

    let history_id = match writer.insert_history(names.history_table(), fields) {
        Ok(history_id) => history_id,
        Err(source) => {
            warn!(entity = alias, %id, error = %source, "History row could not be saved");
            cycle.diagnostics_mut().error(
                alias,
                format!(
                    "The {} was not saved: the audit data could not be saved",
                    names.humanized()
                ),
            );
            cycle.record_error(ReplaceError::Persistence {
                entity: alias.to_owned(),
                id,
                source,
            });
            return ArchivalOutcome::ArchiveFailed;
        }
    };
    cycle.record_history_id(history_id.clone());

    // The back-link write replaces the pending data; the caller's intent is
    // put back once it is done.
    let pending = entity.data.clone();
    entity.id = Some(id.clone());

    cycle.set_linking(true);
    let linked = writer.save_field(cycle, entity, &id, &link_field, history_id.to_value());
    cycle.set_linking(false);

    entity.data = pending;

    match linked {
        Ok(()) => {
            cycle.diagnostics_mut().debug(
                alias,
                format!("{alias} {id} replaced by audit row {history_id}"),
            );
            cycle.mark_success(history_id.clone());
            ArchivalOutcome::Linked { history_id }
        }
        Err(source) => {
            warn!(entity = alias, %id, %history_id, error = %source, "History row could not be linked");
            cycle.diagnostics_mut().error(
                alias,
                format!(
                    "The {} was not saved: the audit row ({history_id}) could not be linked",
                    names.humanized()
                ),
            );
            cycle.record_error(ReplaceError::Link {
                entity: alias.to_owned(),
                id,
                history_id: history_id.clone(),
                source,
            });
            ArchivalOutcome::LinkFailed { history_id }
        }
    }
}
