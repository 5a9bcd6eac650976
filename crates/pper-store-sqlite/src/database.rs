//! Connection management: one short-lived connection per repository call.

use std::{
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use rusqlite::{Connection, OpenFlags};
use uuid::Uuid;

use crate::Result;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum Target {
  File(PathBuf),
  /// Named shared-cache in-memory database. The anchor connection keeps it
  /// alive while per-call connections come and go.
  Memory {
    uri:     String,
    _anchor: Mutex<Connection>,
  },
}

/// Where connections come from.
///
/// Cloning is cheap; clones open connections to the same database.
#[derive(Clone)]
pub struct Database {
  target: Arc<Target>,
}

impl Database {
  /// Use (or create) the SQLite file at `path`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let db = Self { target: Arc::new(Target::File(path.as_ref().to_path_buf())) };
    // Fail now rather than on the first query.
    db.connect()?;
    Ok(db)
  }

  /// A private in-memory database, mostly for tests.
  pub fn open_in_memory() -> Result<Self> {
    let uri = format!("file:pper-{}?mode=memory&cache=shared", Uuid::new_v4().simple());
    let anchor = Connection::open_with_flags(&uri, memory_flags())?;
    Ok(Self {
      target: Arc::new(Target::Memory { uri, _anchor: Mutex::new(anchor) }),
    })
  }

  /// Open a fresh connection with foreign keys enforced.
  pub fn connect(&self) -> Result<Connection> {
    let conn = match self.target.as_ref() {
      Target::File(path) => Connection::open(path)?,
      Target::Memory { uri, .. } => Connection::open_with_flags(uri, memory_flags())?,
    };
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
  }
}

fn memory_flags() -> OpenFlags {
  OpenFlags::SQLITE_OPEN_READ_WRITE
    | OpenFlags::SQLITE_OPEN_CREATE
    | OpenFlags::SQLITE_OPEN_URI
    | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

impl std::fmt::Debug for Database {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.target.as_ref() {
      Target::File(path) => f.debug_tuple("Database").field(path).finish(),
      Target::Memory { uri, .. } => f.debug_tuple("Database").field(uri).finish(),
    }
  }
}
