//! Configuration for replaceable entity types.
//!
//! Each entity type that archives its replaced versions carries a
//! [`ReplaceableSettings`]: the required name of the field that points at
//! the latest history row, and optional aliases under which the original
//! creation and modification timestamps are stored on history rows.
//!
//! A whole application can declare its entity types in one YAML document,
//! loaded through [`VersioningConfig`]:
//!
//! ```yaml
//! timestamps:
//!   created: createdAt
//!   modified: modifiedAt
//! entities:
//!   Invoice:
//!     history_row_field: replaced_id
//!     created: original_created
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use supersede_types::{ID_FIELD, TimestampFields};

use crate::error::ReplaceError;
use crate::names::ModelNames;
use crate::snapshot::RenameTable;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration has no entry for the requested entity type.
    #[error("no replaceable settings for entity type {0}")]
    UnknownEntity(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Per-entity-type settings.
///
/// `history_row_field` is required, but it is only checked when a snapshot
/// is captured, so a misconfigured entity type still saves normally and
/// reports the problem on its update cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplaceableSettings {
    /// Field on the entity that points at its latest history row.
    #[serde(default)]
    pub history_row_field: Option<String>,

    /// Name under which history rows keep the original creation timestamp.
    #[serde(default)]
    pub created: Option<String>,

    /// Name under which history rows keep the original modification timestamp.
    #[serde(default)]
    pub modified: Option<String>,
}

impl ReplaceableSettings {
    /// Settings with the required history row field and no aliases.
    pub fn new(history_row_field: impl Into<String>) -> Self {
        Self {
            history_row_field: Some(history_row_field.into()),
            created: None,
            modified: None,
        }
    }

    /// Store the original creation timestamp under `alias`.
    #[must_use]
    pub fn with_created_alias(mut self, alias: impl Into<String>) -> Self {
        self.created = Some(alias.into());
        self
    }

    /// Store the original modification timestamp under `alias`.
    #[must_use]
    pub fn with_modified_alias(mut self, alias: impl Into<String>) -> Self {
        self.modified = Some(alias.into());
        self
    }

    /// The history row field, if it is set and not blank.
    pub fn history_row_field(&self) -> Option<&str> {
        self.history_row_field
            .as_deref()
            .filter(|field| !field.trim().is_empty())
    }

    /// The history row field, or [`ReplaceError::Configuration`].
    pub fn require_history_row_field(&self, entity: &str) -> Result<&str, ReplaceError> {
        self.history_row_field().ok_or_else(|| ReplaceError::Configuration {
            entity: entity.to_owned(),
            reason: format!("the history row field name for {entity} must be set"),
        })
    }

    /// Check that these settings can archive `names` without overwriting a
    /// value, and return the history row field.
    ///
    /// The history row field cannot be the identity, an engine timestamp, or
    /// the back-reference the history rows carry. The timestamp aliases must
    /// pass [`RenameTable::check`].
    pub fn validate(
        &self,
        names: &ModelNames,
        timestamps: &TimestampFields,
    ) -> Result<&str, ReplaceError> {
        let entity = names.alias();
        let field = self.require_history_row_field(entity)?;
        let misconfigured = |reason: String| ReplaceError::Configuration {
            entity: entity.to_owned(),
            reason,
        };

        if field == ID_FIELD || field == timestamps.created || field == timestamps.modified {
            return Err(misconfigured(format!(
                "the history row field for {entity} cannot be the reserved field {field}"
            )));
        }
        if field == names.back_reference() {
            return Err(misconfigured(format!(
                "the history row field for {entity} cannot be the back-reference {field}"
            )));
        }
        self.rename_table()
            .check(timestamps, names.back_reference())
            .map_err(|clash| {
                misconfigured(format!("the timestamp aliases for {entity} clash: {clash}"))
            })?;
        Ok(field)
    }

    /// The timestamp renames these settings ask for. Blank aliases are
    /// ignored.
    pub fn rename_table(&self) -> RenameTable {
        RenameTable {
            created: non_blank(self.created.as_deref()),
            modified: non_blank(self.modified.as_deref()),
        }
    }
}

fn non_blank(alias: Option<&str>) -> Option<String> {
    alias
        .filter(|a| !a.trim().is_empty())
        .map(str::to_owned)
}

/// Versioning configuration for a whole application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersioningConfig {
    /// Timestamp fields the storage engine maintains.
    #[serde(default)]
    pub timestamps: TimestampFields,

    /// Settings per entity type alias.
    #[serde(default)]
    pub entities: BTreeMap<String, ReplaceableSettings>,
}

impl VersioningConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Settings for one entity type.
    pub fn settings_for(&self, entity: &str) -> Result<&ReplaceableSettings, ConfigError> {
        self.entities
            .get(entity)
            .ok_or_else(|| ConfigError::UnknownEntity(entity.to_owned()))
    }
}
