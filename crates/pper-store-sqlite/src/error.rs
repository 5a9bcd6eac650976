//! Error type for `pper-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] pper_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The entity's schema has no column flagged as primary key.
  #[error("entity {0} has no primary key column")]
  MissingPrimaryKey(&'static str),

  /// A lookup named a field the schema does not map to a column.
  #[error("entity {entity} has no column mapping for field {field:?}")]
  UnknownField { entity: &'static str, field: String },

  /// A relation was read as an entity whose schema it does not reference.
  #[error("relation {entity}.{field} does not reference {target}")]
  RelationMismatch {
    entity: &'static str,
    field:  String,
    target: &'static str,
  },

  #[error("{0} rows are append-only and cannot be updated")]
  AppendOnly(&'static str),
}

impl Error {
  /// A `UNIQUE`, `NOT NULL`, `CHECK` or foreign-key constraint rejected the
  /// statement.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Self::Database(e)
        if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
