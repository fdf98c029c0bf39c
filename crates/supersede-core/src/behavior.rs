//! The two pipeline stages for one replaceable entity type.
//!
//! [`Replaceable`] bundles the derived names, the settings, and the
//! timestamp field names, and exposes the stages a write pipeline calls:
//!
//! ```text
//! setup (capture) --> primary write --> after_save (archive + link)
//!                                           |
//!                                           +-- back-link write --> after_save (suppressed)
//! ```

use tracing::debug;

use supersede_db::RecordStore;
use supersede_types::{Entity, TimestampFields};

use crate::capture::capture;
use crate::config::{ConfigError, ReplaceableSettings, VersioningConfig};
use crate::coordinator::{EntityWrites, archive_and_link};
use crate::cycle::{ArchivalOutcome, UpdateCycle};
use crate::error::ReplaceError;
use crate::names::ModelNames;

/// Write-time versioning for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaceable {
    names: ModelNames,
    settings: ReplaceableSettings,
    timestamps: TimestampFields,
}

impl Replaceable {
    /// Versioning for `alias` with the default timestamp field names.
    pub fn new(alias: &str, settings: ReplaceableSettings) -> Self {
        Self {
            names: ModelNames::new(alias),
            settings,
            timestamps: TimestampFields::default(),
        }
    }

    /// Use the given engine timestamp field names.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: TimestampFields) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Versioning for `alias` as declared in `config`.
    pub fn from_config(alias: &str, config: &VersioningConfig) -> Result<Self, ConfigError> {
        let settings = config.settings_for(alias)?.clone();
        Ok(Self::new(alias, settings).with_timestamps(config.timestamps.clone()))
    }

    /// Names derived from the alias.
    pub const fn names(&self) -> &ModelNames {
        &self.names
    }

    /// The configured settings.
    pub const fn settings(&self) -> &ReplaceableSettings {
        &self.settings
    }

    /// The engine's timestamp field names.
    pub const fn timestamps(&self) -> &TimestampFields {
        &self.timestamps
    }

    /// Capture stage: snapshot the persisted row before the write.
    ///
    /// Never fails. The returned cycle is ready only if capture succeeded;
    /// otherwise it carries the error and an error diagnostic.
    pub fn setup<S: RecordStore + ?Sized>(&self, store: &S, entity: &Entity) -> UpdateCycle {
        let alias = self.names.alias();
        let mut cycle = UpdateCycle::new(alias);

        let captured = capture(
            store,
            &self.names,
            &self.settings,
            &self.timestamps,
            entity.id.as_ref(),
        )
        .and_then(|snapshot| {
            let field = self.settings.require_history_row_field(alias)?;
            Ok((snapshot, field.to_owned()))
        });

        match captured {
            Ok((snapshot, link_field)) => {
                cycle.diagnostics_mut().debug(
                    alias,
                    format!("original {} data captured", self.names.humanized()),
                );
                cycle.mark_ready(snapshot, link_field);
            }
            Err(error) => {
                let message = match &error {
                    ReplaceError::Configuration { reason, .. } => {
                        format!("replaceable setup failure: {reason}")
                    }
                    ReplaceError::IdentityMissing { .. } => {
                        format!("replaceable setup failure: {alias} id must be set")
                    }
                    _ => format!("replaceable setup failure: failed to capture original {alias} data"),
                };
                cycle.diagnostics_mut().error(alias, message);
                cycle.record_error(error);
            }
        }

        cycle
    }

    /// Post-write stage: archive and link, unless the write being reported
    /// is the back-link itself.
    pub fn after_save<W: EntityWrites + ?Sized>(
        &self,
        writer: &mut W,
        cycle: &mut UpdateCycle,
        entity: &mut Entity,
    ) -> ArchivalOutcome {
        let alias = self.names.alias();
        if cycle.is_linking() {
            cycle
                .diagnostics_mut()
                .debug(alias, format!("{alias} back-link write ignored"));
            return ArchivalOutcome::Suppressed;
        }

        let outcome = if cycle.is_ready() {
            archive_and_link(writer, self, cycle, entity)
        } else {
            debug!(entity = alias, "Nothing captured, skipping archival");
            ArchivalOutcome::NotReady
        };
        cycle.record_outcome(outcome.clone());
        outcome
    }
}
