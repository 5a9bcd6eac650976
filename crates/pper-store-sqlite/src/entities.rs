//! Schemas and row mappings for the persisted domain types.

use pper_core::{group::Group, membership::Membership, player::Player};
use rusqlite::types::Value;

use crate::{
  Result,
  encode::{dt_value, opt_dt_value},
  meta::{Column, Entity, Relation, SavePolicy, Schema},
  row::RowReader,
};

pub const GROUP_SCHEMA: Schema = Schema {
  entity:    "Group",
  table:     "group",
  columns:   &[
    Column::primary("id", "id"),
    Column::new("name", "name"),
    Column::new("prefix", "prefix"),
  ],
  relations: &[],
};

pub const PLAYER_SCHEMA: Schema = Schema {
  entity:    "Player",
  table:     "player",
  columns:   &[
    Column::primary("uuid", "uuid"),
    Column::new("display_name", "display_name"),
    Column::new("created_at", "create_date"),
  ],
  relations: &[],
};

pub const MEMBERSHIP_SCHEMA: Schema = Schema {
  entity:    "Membership",
  table:     "membership",
  columns:   &[
    Column::primary("id", "id"),
    Column::new("expires_at", "expire_datetime"),
    Column::new("created_at", "create_date"),
    Column::new("last_group_id", "last_group_id"),
  ],
  relations: &[
    Relation { field: "player", foreign_key: "player_uuid", target: &PLAYER_SCHEMA },
    Relation { field: "group", foreign_key: "group_id", target: &GROUP_SCHEMA },
  ],
};

// ─── Group ───────────────────────────────────────────────────────────────────

impl Entity for Group {
  const SCHEMA: &'static Schema = &GROUP_SCHEMA;
  const SAVE: SavePolicy = SavePolicy::GeneratedKey;

  fn bind(&self, field: &str) -> Value {
    match field {
      "id" => Value::Integer(self.id),
      "name" => Value::Text(self.name.clone()),
      "prefix" => Value::Text(self.prefix.clone()),
      _ => Value::Null,
    }
  }

  fn from_row(row: &RowReader<'_, '_>) -> Result<Self> {
    Ok(Group {
      id:     row.get("id")?,
      name:   row.get("name")?,
      prefix: row.get("prefix")?,
    })
  }

  fn set_generated_id(&mut self, id: i64) { self.id = id; }
}

// ─── Player ──────────────────────────────────────────────────────────────────

impl Entity for Player {
  const SCHEMA: &'static Schema = &PLAYER_SCHEMA;
  const SAVE: SavePolicy = SavePolicy::NaturalKey;

  fn bind(&self, field: &str) -> Value {
    match field {
      "uuid" => Value::Text(self.uuid.clone()),
      "display_name" => Value::Text(self.display_name.clone()),
      "created_at" => dt_value(self.created_at),
      _ => Value::Null,
    }
  }

  fn from_row(row: &RowReader<'_, '_>) -> Result<Self> {
    Ok(Player {
      uuid:         row.get("uuid")?,
      display_name: row.get("display_name")?,
      created_at:   row.get_dt("created_at")?,
    })
  }
}

// ─── Membership ──────────────────────────────────────────────────────────────

impl Entity for Membership {
  const SCHEMA: &'static Schema = &MEMBERSHIP_SCHEMA;
  const SAVE: SavePolicy = SavePolicy::AppendOnly;

  fn bind(&self, field: &str) -> Value {
    match field {
      "id" => Value::Integer(self.id),
      "player" => Value::Text(self.player.uuid.clone()),
      "group" => Value::Integer(self.group.id),
      "expires_at" => opt_dt_value(self.expires_at),
      "created_at" => dt_value(self.created_at),
      "last_group_id" => Value::Integer(self.last_group_id),
      _ => Value::Null,
    }
  }

  fn from_row(row: &RowReader<'_, '_>) -> Result<Self> {
    Ok(Membership {
      id:            row.get("id")?,
      player:        row.related("player")?,
      group:         row.related("group")?,
      expires_at:    row.get_opt_dt("expires_at")?,
      created_at:    row.get_dt("created_at")?,
      last_group_id: row.get("last_group_id")?,
    })
  }

  fn set_generated_id(&mut self, id: i64) { self.id = id; }
}
