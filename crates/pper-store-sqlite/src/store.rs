//! Schema bootstrap and repository construction.

use std::path::Path;

use pper_core::group::Group;

use crate::{
  Result,
  database::Database,
  prefix::TablePrefix,
  repository::{GroupRepository, MembershipRepository, PlayerRepository, Repository},
  schema::{schema_ddl, seed_default_group},
  sql::SqlGenerator,
};

/// The pper tables inside one SQLite database.
///
/// Cloning is cheap; no connection is held between calls.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  db:  Database,
  sql: SqlGenerator,
}

impl SqliteStore {
  /// Open (or create) the database at `path`. Call
  /// [`bootstrap`](Self::bootstrap) before use.
  pub fn open(path: impl AsRef<Path>, prefix: TablePrefix) -> Result<Self> {
    Ok(Self { db: Database::open(path)?, sql: SqlGenerator::new(prefix) })
  }

  /// Open a private in-memory database, mostly for tests.
  pub fn open_in_memory(prefix: TablePrefix) -> Result<Self> {
    Ok(Self { db: Database::open_in_memory()?, sql: SqlGenerator::new(prefix) })
  }

  /// Create missing tables and seed `default_group` under id 1.
  ///
  /// Returns `true` if the default group row was inserted by this call.
  pub fn bootstrap(&self, default_group: &Group) -> Result<bool> {
    let prefix = self.sql.prefix();
    let conn = self.db.connect()?;
    conn.execute_batch(&schema_ddl(prefix))?;
    let seeded = conn.execute(
      &seed_default_group(prefix),
      rusqlite::params![default_group.name, default_group.prefix],
    )?;

    if seeded > 0 {
      tracing::info!(group = %default_group.name, "seeded default group");
    } else {
      tracing::debug!("default group already present");
    }
    Ok(seeded > 0)
  }

  pub fn prefix(&self) -> &TablePrefix { self.sql.prefix() }

  pub fn sql(&self) -> &SqlGenerator { &self.sql }

  pub fn database(&self) -> &Database { &self.db }

  pub fn groups(&self) -> GroupRepository { self.repository() }

  pub fn players(&self) -> PlayerRepository { self.repository() }

  pub fn memberships(&self) -> MembershipRepository { self.repository() }

  fn repository<E: crate::meta::Entity>(&self) -> Repository<E> {
    Repository::new(self.db.clone(), self.sql.clone())
  }
}
