//! SQL generation from [`Schema`] descriptors.
//!
//! The root table is aliased by its entity name and every relation is joined
//! under the alias of its target entity:
//!
//! ```text
//! SELECT "Membership"."id" AS "Membership_id", ...,
//!        "Player"."uuid" AS "Player_uuid", ...
//! FROM "pper_membership" AS "Membership"
//! LEFT JOIN "pper_player" AS "Player" ON "Player"."uuid" = "Membership"."player_uuid"
//! ```
//!
//! Identifiers are always double-quoted; `Group` is a keyword.

use rusqlite::types::Value;

use crate::{
  Result,
  meta::{Entity, Relation, SavePolicy, Schema, is_unset_key},
  prefix::TablePrefix,
};

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct SqlGenerator {
  prefix: TablePrefix,
}

impl SqlGenerator {
  pub fn new(prefix: TablePrefix) -> Self { Self { prefix } }

  pub fn prefix(&self) -> &TablePrefix { &self.prefix }

  /// Quoted, prefixed table name.
  pub fn table(&self, schema: &Schema) -> String {
    quote(&self.prefix.apply(schema.table))
  }

  pub fn select(&self, schema: &'static Schema) -> Select<'_> {
    Select {
      generator: self,
      schema,
      distinct: false,
      projection: None,
      filters: Vec::new(),
      order: Vec::new(),
    }
  }

  /// `INSERT` of every column followed by every relation's foreign key.
  ///
  /// An unset generated key binds as `NULL` so the store assigns one. An
  /// append-only entity always gets a fresh key.
  pub fn insert<E: Entity>(&self, entity: &E) -> Result<Statement> {
    let schema = E::SCHEMA;
    schema.primary_key()?;

    let mut names = Vec::new();
    let mut params = Vec::new();

    for col in schema.columns {
      let mut value = entity.bind(col.field);
      if col.primary
        && (is_unset_key(&value) || E::SAVE == SavePolicy::AppendOnly)
      {
        value = Value::Null;
      }
      names.push(quote(col.name));
      params.push(value);
    }
    for rel in schema.relations {
      names.push(quote(rel.foreign_key));
      params.push(entity.bind(rel.field));
    }

    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      self.table(schema),
      names.join(", "),
      placeholders(1, names.len()),
    );
    Ok(Statement { sql, params })
  }

  /// `UPDATE` of every non-primary column and foreign key, keyed by the
  /// primary key bound last.
  pub fn update<E: Entity>(&self, entity: &E) -> Result<Statement> {
    let schema = E::SCHEMA;
    let pk = schema.primary_key()?;

    let mut assignments = Vec::new();
    let mut params = Vec::new();

    for col in schema.columns.iter().filter(|c| !c.primary) {
      params.push(entity.bind(col.field));
      assignments.push(format!("{} = ?{}", quote(col.name), params.len()));
    }
    for rel in schema.relations {
      params.push(entity.bind(rel.field));
      assignments.push(format!("{} = ?{}", quote(rel.foreign_key), params.len()));
    }
    params.push(entity.bind(pk.field));

    let sql = format!(
      "UPDATE {} SET {} WHERE {} = ?{}",
      self.table(schema),
      assignments.join(", "),
      quote(pk.name),
      params.len(),
    );
    Ok(Statement { sql, params })
  }
}

// ─── SELECT builder ──────────────────────────────────────────────────────────

/// A `SELECT` over one root entity and all of its relations.
///
/// Filters take positional parameters in the order they were added.
#[derive(Debug, Clone)]
pub struct Select<'g> {
  generator:  &'g SqlGenerator,
  schema:     &'static Schema,
  distinct:   bool,
  projection: Option<&'static Relation>,
  filters:    Vec<String>,
  order:      Vec<String>,
}

impl Select<'_> {
  pub fn distinct(mut self) -> Self {
    self.distinct = true;
    self
  }

  /// Return only the columns of relation `field`, read with its target
  /// schema.
  pub fn project(mut self, field: &str) -> Result<Self> {
    let rel = self
      .schema
      .relation(field)
      .ok_or_else(|| self.schema.unknown_field(field))?;
    self.projection = Some(rel);
    Ok(self)
  }

  /// `<Root>.<column> = ?`; relation fields compare their foreign key.
  pub fn filter(mut self, field: &str) -> Result<Self> {
    let column = self.schema.stored_column(field)?;
    self.push_filter(self.schema.entity, column);
    Ok(self)
  }

  /// `<Root>.<primary key> = ?`.
  pub fn by_id(self) -> Result<Self> {
    let pk = self.schema.primary_key()?;
    self.filter(pk.field)
  }

  /// `<Target>.<column> = ?` on a joined relation.
  pub fn filter_related(mut self, relation: &str, field: &str) -> Result<Self> {
    let rel = self
      .schema
      .relation(relation)
      .ok_or_else(|| self.schema.unknown_field(relation))?;
    let col = rel
      .target
      .column(field)
      .ok_or_else(|| rel.target.unknown_field(field))?;
    self.push_filter(rel.target.entity, col.name);
    Ok(self)
  }

  pub fn order_desc(mut self, field: &str) -> Result<Self> {
    let column = self.schema.stored_column(field)?;
    self
      .order
      .push(format!("{}.{} DESC", quote(self.schema.entity), quote(column)));
    Ok(self)
  }

  pub fn sql(&self) -> Result<String> {
    let schema = self.schema;
    schema.primary_key()?;

    let mut projected = Vec::new();
    match self.projection {
      Some(rel) => aliased_columns(rel.target, &mut projected),
      None => {
        aliased_columns(schema, &mut projected);
        for rel in schema.relations {
          aliased_columns(rel.target, &mut projected);
        }
      }
    }

    let mut sql = String::from("SELECT ");
    if self.distinct {
      sql.push_str("DISTINCT ");
    }
    sql.push_str(&projected.join(", "));
    sql.push_str(&format!(
      " FROM {} AS {}",
      self.generator.table(schema),
      quote(schema.entity)
    ));
    for rel in schema.relations {
      sql.push_str(&self.join(rel)?);
    }
    if !self.filters.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&self.filters.join(" AND "));
    }
    if !self.order.is_empty() {
      sql.push_str(" ORDER BY ");
      sql.push_str(&self.order.join(", "));
    }
    Ok(sql)
  }

  fn join(&self, rel: &Relation) -> Result<String> {
    let target = rel.target;
    let target_pk = target.primary_key()?;
    Ok(format!(
      " LEFT JOIN {} AS {} ON {}.{} = {}.{}",
      self.generator.table(target),
      quote(target.entity),
      quote(target.entity),
      quote(target_pk.name),
      quote(self.schema.entity),
      quote(rel.foreign_key),
    ))
  }

  fn push_filter(&mut self, alias: &str, column: &str) {
    let n = self.filters.len() + 1;
    self
      .filters
      .push(format!("{}.{} = ?{n}", quote(alias), quote(column)));
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn aliased_columns(schema: &Schema, out: &mut Vec<String>) {
  for col in schema.columns {
    out.push(format!(
      "{}.{} AS {}",
      quote(schema.entity),
      quote(col.name),
      quote(&schema.alias(col.field)),
    ));
  }
}

fn placeholders(first: usize, count: usize) -> String {
  (first..first + count)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

pub(crate) fn quote(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

