//! Names derived from an entity type's alias.
//!
//! Everything the pipeline writes is named deterministically from the alias
//! (`InvoiceLine` here):
//!
//! | Name | Value |
//! |------|-------|
//! | underscored | `invoice_line` |
//! | humanized | `Invoice Line` |
//! | history table | `ReplacedInvoiceLine` |
//! | back-reference field | `invoice_line_id` |

/// Prefix of every history table name.
pub const HISTORY_TABLE_PREFIX: &str = "Replaced";

/// The derived names for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    alias: String,
    underscored: String,
    humanized: String,
    history_table: String,
    back_reference: String,
}

impl ModelNames {
    /// Derive all names from an entity type alias.
    pub fn new(alias: &str) -> Self {
        let underscored = underscore(alias);
        Self {
            alias: alias.to_owned(),
            humanized: humanize(&underscored),
            history_table: format!("{HISTORY_TABLE_PREFIX}{alias}"),
            back_reference: format!("{underscored}_id"),
            underscored,
        }
    }

    /// The entity type alias, which is also its table name.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `snake_case` form of the alias.
    pub fn underscored(&self) -> &str {
        &self.underscored
    }

    /// Human-readable form used in diagnostic messages.
    pub fn humanized(&self) -> &str {
        &self.humanized
    }

    /// Table that receives history rows.
    pub fn history_table(&self) -> &str {
        &self.history_table
    }

    /// Field on a history row pointing back at the entity.
    pub fn back_reference(&self) -> &str {
        &self.back_reference
    }
}

/// Convert `CamelCase` to `snake_case`.
///
/// An underscore is inserted before every uppercase letter that follows a
/// letter or digit.
pub fn underscore(word: &str) -> String {
    let mut out = String::with_capacity(word.len().saturating_add(4));
    let mut prev: Option<char> = None;
    for c in word.chars() {
        if c.is_uppercase() {
            if prev.is_some_and(char::is_alphanumeric) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Convert `snake_case` to capitalized words.
pub fn humanize(underscored: &str) -> String {
    underscored
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
