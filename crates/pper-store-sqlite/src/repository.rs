//! Generic per-entity repositories plus entity-specific queries.
//!
//! Every method opens a connection, runs one statement (two for a natural-key
//! save) and drops the connection again. Nothing spans calls.

use std::marker::PhantomData;

use pper_core::{group::Group, membership::Membership, player::Player};
use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
  Error, Result,
  database::Database,
  meta::{Entity, SavePolicy, is_unset_key},
  row::RowReader,
  sql::{SqlGenerator, Statement},
};

pub type GroupRepository = Repository<Group>;
pub type PlayerRepository = Repository<Player>;
pub type MembershipRepository = Repository<Membership>;

pub struct Repository<E> {
  db:      Database,
  sql:     SqlGenerator,
  _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
  fn clone(&self) -> Self {
    Self { db: self.db.clone(), sql: self.sql.clone(), _entity: PhantomData }
  }
}

impl<E: Entity> std::fmt::Debug for Repository<E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Repository")
      .field("entity", &E::SCHEMA.entity)
      .field("db", &self.db)
      .finish()
  }
}

impl<E: Entity> Repository<E> {
  pub fn new(db: Database, sql: SqlGenerator) -> Self {
    Self { db, sql, _entity: PhantomData }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn find_by_id(&self, id: impl Into<Value>) -> Result<Option<E>> {
    let sql = self.sql.select(E::SCHEMA).by_id()?.sql()?;
    Ok(self.query(&sql, vec![id.into()])?.into_iter().next())
  }

  /// Look up the stored row with the same primary key as `template`.
  pub fn find_one(&self, template: &E) -> Result<Option<E>> {
    self.find_by_id(template.primary_value()?)
  }

  pub fn find_all(&self) -> Result<Vec<E>> {
    let sql = self.sql.select(E::SCHEMA).sql()?;
    self.query(&sql, Vec::new())
  }

  /// Rows whose `field` equals `value`. Relation fields compare the foreign
  /// key. An unmapped field fails before any connection is opened.
  pub fn find_by_field(
    &self,
    field: &str,
    value: impl Into<Value>,
  ) -> Result<Vec<E>> {
    let sql = self.sql.select(E::SCHEMA).filter(field)?.sql()?;
    self.query(&sql, vec![value.into()])
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Insert or update according to the entity's [`SavePolicy`].
  pub fn save(&self, entity: E) -> Result<E> {
    match E::SAVE {
      SavePolicy::AppendOnly => self.insert(entity),
      SavePolicy::GeneratedKey => {
        if is_unset_key(&entity.primary_value()?) {
          self.insert(entity)
        } else {
          self.update(entity)
        }
      }
      SavePolicy::NaturalKey => {
        if self.find_one(&entity)?.is_some() {
          self.update(entity)
        } else {
          self.insert(entity)
        }
      }
    }
  }

  pub fn update(&self, entity: E) -> Result<E> {
    if E::SAVE == SavePolicy::AppendOnly {
      return Err(Error::AppendOnly(E::SCHEMA.entity));
    }
    let stmt = self.sql.update(&entity)?;
    let changed = self.execute(&stmt)?.0;
    if changed == 0 {
      tracing::debug!(entity = E::SCHEMA.entity, "update matched no rows");
    }
    Ok(entity)
  }

  fn insert(&self, mut entity: E) -> Result<E> {
    let stmt = self.sql.insert(&entity)?;
    let (_, rowid) = self.execute(&stmt)?;
    if E::SAVE != SavePolicy::NaturalKey {
      entity.set_generated_id(rowid);
    }
    Ok(entity)
  }

  // ── Plumbing ──────────────────────────────────────────────────────────────

  fn connect(&self) -> Result<Connection> { self.db.connect() }

  /// Returns `(rows changed, last insert rowid)`.
  fn execute(&self, stmt: &Statement) -> Result<(usize, i64)> {
    tracing::debug!(sql = %stmt.sql, "execute");
    let conn = self.connect()?;
    let changed = conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
    Ok((changed, conn.last_insert_rowid()))
  }

  fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<E>> {
    self.query_as::<E>(sql, params)
  }

  /// Run `sql` and map each row through `T`'s schema.
  fn query_as<T: Entity>(&self, sql: &str, params: Vec<Value>) -> Result<Vec<T>> {
    tracing::debug!(sql, "query");
    let conn = self.connect()?;
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
      out.push(T::from_row(&RowReader::new(row, T::SCHEMA))?);
    }
    Ok(out)
  }
}

// ─── Entity-specific queries ─────────────────────────────────────────────────

impl Repository<Group> {
  pub fn find_first_by_name(&self, name: &str) -> Result<Option<Group>> {
    Ok(self.find_by_field("name", name.to_owned())?.into_iter().next())
  }
}

impl Repository<Player> {
  pub fn find_first_by_name(&self, name: &str) -> Result<Option<Player>> {
    Ok(
      self
        .find_by_field("display_name", name.to_owned())?
        .into_iter()
        .next(),
    )
  }

  /// Distinct players that ever held `group_id`, current or not.
  pub fn history_in_group(&self, group_id: i64) -> Result<Vec<Player>> {
    let sql = self
      .sql
      .select(Membership::SCHEMA)
      .distinct()
      .project("player")?
      .filter("group")?
      .sql()?;
    self.query_as::<Player>(&sql, vec![Value::Integer(group_id)])
  }
}

impl Repository<Membership> {
  /// A player's full history, newest first.
  pub fn find_all_by_player(&self, uuid: &str) -> Result<Vec<Membership>> {
    let sql = self
      .sql
      .select(Membership::SCHEMA)
      .filter("player")?
      .order_desc("created_at")?
      .order_desc("id")?
      .sql()?;
    self.query(&sql, vec![Value::Text(uuid.to_owned())])
  }
}
