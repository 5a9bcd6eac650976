//! Validated table-name prefix.

use std::{fmt, sync::Arc};

pub const DEFAULT_TABLE_PREFIX: &str = "pper_";

/// Prefix prepended to every table name.
///
/// Only ASCII alphanumerics and `_` are accepted. Anything else falls back to
/// [`DEFAULT_TABLE_PREFIX`], which makes the prefix safe to splice into DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrefix(Arc<str>);

impl TablePrefix {
  pub fn new(raw: &str) -> Self {
    let trimmed = raw.trim();
    if is_valid(trimmed) {
      Self(trimmed.into())
    } else {
      if !trimmed.is_empty() {
        tracing::warn!(
          prefix = trimmed,
          fallback = DEFAULT_TABLE_PREFIX,
          "invalid table prefix, using default"
        );
      }
      Self::default()
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// `<prefix><table>`.
  pub fn apply(&self, table: &str) -> String { format!("{}{table}", self.0) }
}

impl Default for TablePrefix {
  fn default() -> Self { Self(DEFAULT_TABLE_PREFIX.into()) }
}

impl fmt::Display for TablePrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

fn is_valid(prefix: &str) -> bool {
  !prefix.is_empty()
    && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
