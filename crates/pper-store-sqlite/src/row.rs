//! Reading entities back out of aliased result rows.

use chrono::{DateTime, Utc};
use rusqlite::{Row, types::FromSql};

use crate::{
  Error, Result,
  encode::decode_dt,
  meta::{Entity, Schema},
};

/// A result row viewed through one entity's schema.
///
/// Fields are read by name from columns aliased `<Entity>_<field>`; joined
/// relations are read through the target schema's aliases.
pub struct RowReader<'r, 's> {
  row:    &'r Row<'s>,
  schema: &'static Schema,
}

impl<'r, 's> RowReader<'r, 's> {
  pub fn new(row: &'r Row<'s>, schema: &'static Schema) -> Self {
    Self { row, schema }
  }

  pub fn get<T: FromSql>(&self, field: &str) -> Result<T> {
    if self.schema.column(field).is_none() {
      return Err(self.schema.unknown_field(field));
    }
    Ok(self.row.get(self.schema.alias(field).as_str())?)
  }

  pub fn get_dt(&self, field: &str) -> Result<DateTime<Utc>> {
    let raw: String = self.get(field)?;
    decode_dt(&raw)
  }

  pub fn get_opt_dt(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = self.get(field)?;
    raw.as_deref().map(decode_dt).transpose()
  }

  /// Map the joined columns of relation `field` into its target entity.
  pub fn related<T: Entity>(&self, field: &str) -> Result<T> {
    let relation = self
      .schema
      .relation(field)
      .ok_or_else(|| self.schema.unknown_field(field))?;

    if relation.target != T::SCHEMA {
      return Err(Error::RelationMismatch {
        entity: self.schema.entity,
        field:  field.to_owned(),
        target: T::SCHEMA.entity,
      });
    }

    T::from_row(&RowReader::new(self.row, relation.target))
  }
}
