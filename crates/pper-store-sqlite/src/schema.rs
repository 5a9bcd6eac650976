//! SQL schema for the pper SQLite store.
//!
//! `{PREFIX}` is replaced with the validated table prefix before execution.
//! Idempotent thanks to `IF NOT EXISTS`.

use crate::prefix::TablePrefix;

const SCHEMA_TEMPLATE: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS "{PREFIX}group" (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE,
    prefix  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS "{PREFIX}player" (
    uuid          TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    create_date   TEXT NOT NULL      -- RFC 3339 UTC
);

-- Memberships are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS "{PREFIX}membership" (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    player_uuid      TEXT    NOT NULL REFERENCES "{PREFIX}player"(uuid),
    group_id         INTEGER NOT NULL REFERENCES "{PREFIX}group"(id),
    expire_datetime  TEXT,             -- NULL = permanent
    create_date      TEXT    NOT NULL,
    last_group_id    INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS "{PREFIX}membership_player_idx"
    ON "{PREFIX}membership"(player_uuid, create_date);
CREATE INDEX IF NOT EXISTS "{PREFIX}membership_group_idx"
    ON "{PREFIX}membership"(group_id);
"#;

/// Seeds the default group under id 1 unless that id or name is taken.
const SEED_TEMPLATE: &str =
  r#"INSERT OR IGNORE INTO "{PREFIX}group" (id, name, prefix) VALUES (1, ?1, ?2)"#;

pub fn schema_ddl(prefix: &TablePrefix) -> String {
  SCHEMA_TEMPLATE.replace("{PREFIX}", prefix.as_str())
}

pub fn seed_default_group(prefix: &TablePrefix) -> String {
  SEED_TEMPLATE.replace("{PREFIX}", prefix.as_str())
}
