//! Group definitions.

use serde::{Deserialize, Serialize};

/// A named category with a display prefix.
///
/// Only the prefix may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  /// Store-assigned identity; `0` until the group is first saved.
  pub id:     i64,
  pub name:   String,
  pub prefix: String,
}

impl Group {
  /// A group that has not been persisted yet.
  pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
    Self { id: 0, name: name.into(), prefix: prefix.into() }
  }

  pub fn is_persisted(&self) -> bool { self.id > 0 }
}
