//! Static entity descriptors.
//!
//! Every persisted type declares a `const` [`Schema`]: its entity name (used
//! as the SQL alias and the column-alias prefix), its un-prefixed table name,
//! its columns in declaration order and its one-hop relations. Nothing is
//! discovered at runtime.

use rusqlite::types::Value;

use crate::{Error, Result, row::RowReader};

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// A mapped scalar field.
#[derive(Debug, PartialEq, Eq)]
pub struct Column {
  /// Rust field name; result columns are aliased `<Entity>_<field>`.
  pub field:   &'static str,
  /// Column name in the table.
  pub name:    &'static str,
  pub primary: bool,
}

impl Column {
  pub const fn new(field: &'static str, name: &'static str) -> Self {
    Self { field, name, primary: false }
  }

  pub const fn primary(field: &'static str, name: &'static str) -> Self {
    Self { field, name, primary: true }
  }
}

/// A field holding another entity, stored as a foreign key and loaded with a
/// `LEFT JOIN`. The target's own relations are never followed.
#[derive(Debug, PartialEq, Eq)]
pub struct Relation {
  pub field:       &'static str,
  pub foreign_key: &'static str,
  pub target:      &'static Schema,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
  pub entity:    &'static str,
  pub table:     &'static str,
  pub columns:   &'static [Column],
  pub relations: &'static [Relation],
}

impl Schema {
  pub fn primary_key(&self) -> Result<&'static Column> {
    self
      .columns
      .iter()
      .find(|c| c.primary)
      .ok_or(Error::MissingPrimaryKey(self.entity))
  }

  pub fn column(&self, field: &str) -> Option<&'static Column> {
    self.columns.iter().find(|c| c.field == field)
  }

  pub fn relation(&self, field: &str) -> Option<&'static Relation> {
    self.relations.iter().find(|r| r.field == field)
  }

  /// The stored column a filter on `field` compares: the column itself, or
  /// the foreign key for a relation field.
  pub fn stored_column(&self, field: &str) -> Result<&'static str> {
    if let Some(col) = self.column(field) {
      return Ok(col.name);
    }
    if let Some(rel) = self.relation(field) {
      return Ok(rel.foreign_key);
    }
    Err(self.unknown_field(field))
  }

  /// Result-set alias for `field`.
  pub fn alias(&self, field: &str) -> String {
    format!("{}_{field}", self.entity)
  }

  pub(crate) fn unknown_field(&self, field: &str) -> Error {
    Error::UnknownField { entity: self.entity, field: field.to_owned() }
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// How [`Repository::save`](crate::Repository::save) treats an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
  /// Store-assigned integer key: insert while the key is `0`, else update.
  GeneratedKey,
  /// Caller-supplied key: update when a row with the key exists, else
  /// insert.
  NaturalKey,
  /// Every save inserts a new row with a fresh key; updates are refused.
  AppendOnly,
}

pub trait Entity: Sized {
  const SCHEMA: &'static Schema;
  const SAVE: SavePolicy;

  /// Value to bind for a column field, or the foreign key of a relation
  /// field. Only called with fields declared in [`Entity::SCHEMA`].
  fn bind(&self, field: &str) -> Value;

  /// Rebuild the entity from a row aliased with [`Entity::SCHEMA`].
  fn from_row(row: &RowReader<'_, '_>) -> Result<Self>;

  /// Record the key the store generated on insert.
  fn set_generated_id(&mut self, _id: i64) {}

  /// Current primary-key value.
  fn primary_value(&self) -> Result<Value> {
    Ok(self.bind(Self::SCHEMA.primary_key()?.field))
  }
}

/// `true` for the "not yet assigned" key values (`0`, empty text, `NULL`).
pub fn is_unset_key(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Integer(n) => *n == 0,
    Value::Text(s) => s.is_empty(),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const KEYLESS: Schema = Schema {
    entity:    "Keyless",
    table:     "keyless",
    columns:   &[Column::new("label", "label")],
    relations: &[],
  };

  const PARENT: Schema = Schema {
    entity:    "Parent",
    table:     "parent",
    columns:   &[Column::primary("id", "id")],
    relations: &[],
  };

  const CHILD: Schema = Schema {
    entity:    "Child",
    table:     "child",
    columns:   &[Column::primary("id", "id"), Column::new("created_at", "create_date")],
    relations: &[Relation { field: "parent", foreign_key: "parent_id", target: &PARENT }],
  };

  #[test]
  fn keyless_schema_reports_missing_primary_key() {
    assert!(matches!(KEYLESS.primary_key(), Err(Error::MissingPrimaryKey("Keyless"))));
  }

  #[test]
  fn stored_column_resolves_columns_and_relations() {
    assert_eq!(CHILD.stored_column("created_at").unwrap(), "create_date");
    assert_eq!(CHILD.stored_column("parent").unwrap(), "parent_id");
  }

  #[test]
  fn stored_column_rejects_unmapped_field() {
    let err = CHILD.stored_column("nickname").unwrap_err();
    assert!(matches!(err, Error::UnknownField { entity: "Child", field } if field == "nickname"));
  }

  #[test]
  fn alias_uses_entity_and_field_names() {
    assert_eq!(CHILD.alias("created_at"), "Child_created_at");
  }

  #[test]
  fn unset_key_sentinels() {
    assert!(is_unset_key(&Value::Integer(0)));
    assert!(is_unset_key(&Value::Text(String::new())));
    assert!(is_unset_key(&Value::Null));
    assert!(!is_unset_key(&Value::Integer(4)));
    assert!(!is_unset_key(&Value::Text("abc".into())));
  }
}
