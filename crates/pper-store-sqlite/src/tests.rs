//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use pper_core::{group::Group, membership::Membership, player::Player};
use rusqlite::types::Value;
use uuid::Uuid;

use crate::{
  Column, Entity, Error, Result, RowReader, SavePolicy, Schema, SqlGenerator,
  SqliteStore, TablePrefix,
};

fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory(TablePrefix::default()).expect("in-memory store");
  s.bootstrap(&Group::new("Player", "")).expect("bootstrap");
  s
}

fn player(name: &str) -> Player {
  Player::from_identity(Uuid::new_v4(), name)
}

fn saved_player(s: &SqliteStore, name: &str) -> Player {
  s.players().save(player(name)).unwrap()
}

fn saved_group(s: &SqliteStore, name: &str, prefix: &str) -> Group {
  s.groups().save(Group::new(name, prefix)).unwrap()
}

// ─── SQL generation ──────────────────────────────────────────────────────────

#[test]
fn group_select_aliases_every_column() {
  let sql = SqlGenerator::default()
    .select(Group::SCHEMA)
    .sql()
    .unwrap();
  assert_eq!(
    sql,
    "SELECT \"Group\".\"id\" AS \"Group_id\", \"Group\".\"name\" AS \"Group_name\", \
     \"Group\".\"prefix\" AS \"Group_prefix\" FROM \"pper_group\" AS \"Group\""
  );
}

#[test]
fn membership_select_joins_both_relations() {
  let sql = SqlGenerator::default()
    .select(Membership::SCHEMA)
    .filter("player")
    .unwrap()
    .order_desc("created_at")
    .unwrap()
    .sql()
    .unwrap();

  assert!(sql.contains("\"Player\".\"display_name\" AS \"Player_display_name\""));
  assert!(sql.contains("\"Group\".\"prefix\" AS \"Group_prefix\""));
  assert!(sql.contains(
    " LEFT JOIN \"pper_player\" AS \"Player\" ON \"Player\".\"uuid\" = \"Membership\".\"player_uuid\""
  ));
  assert!(sql.contains(
    " LEFT JOIN \"pper_group\" AS \"Group\" ON \"Group\".\"id\" = \"Membership\".\"group_id\""
  ));
  assert!(sql.ends_with(
    " WHERE \"Membership\".\"player_uuid\" = ?1 ORDER BY \"Membership\".\"create_date\" DESC"
  ));
}

#[test]
fn insert_lists_columns_then_foreign_keys() {
  let m = Membership::new(player("Alex"), Group { id: 3, ..Group::new("VIP", "") }, None, 1);
  let stmt = SqlGenerator::default().insert(&m).unwrap();
  assert_eq!(
    stmt.sql,
    "INSERT INTO \"pper_membership\" (\"id\", \"expire_datetime\", \"create_date\", \
     \"last_group_id\", \"player_uuid\", \"group_id\") VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
  );
  assert_eq!(stmt.params[0], Value::Null);
  assert_eq!(stmt.params[1], Value::Null);
  assert_eq!(stmt.params[3], Value::Integer(1));
  assert_eq!(stmt.params[4], Value::Text(m.player.uuid.clone()));
  assert_eq!(stmt.params[5], Value::Integer(3));
}

#[test]
fn insert_binds_unset_generated_key_as_null() {
  let stmt = SqlGenerator::default().insert(&Group::new("VIP", "v")).unwrap();
  assert_eq!(stmt.params, vec![Value::Null, Value::Text("VIP".into()), Value::Text("v".into())]);
}

#[test]
fn update_binds_primary_key_last() {
  let g = Group { id: 9, name: "VIP".into(), prefix: "v".into() };
  let stmt = SqlGenerator::default().update(&g).unwrap();
  assert_eq!(
    stmt.sql,
    "UPDATE \"pper_group\" SET \"name\" = ?1, \"prefix\" = ?2 WHERE \"id\" = ?3"
  );
  assert_eq!(stmt.params.last(), Some(&Value::Integer(9)));
}

#[test]
fn generator_uses_configured_prefix() {
  let sql = SqlGenerator::new(TablePrefix::new("srv2_"))
    .select(Player::SCHEMA)
    .sql()
    .unwrap();
  assert!(sql.contains("FROM \"srv2_player\" AS \"Player\""));
}

// ─── Descriptor errors ───────────────────────────────────────────────────────

const KEYLESS_SCHEMA: Schema = Schema {
  entity:    "Note",
  table:     "note",
  columns:   &[Column::new("text", "text")],
  relations: &[],
};

struct Note {
  text: String,
}

impl Entity for Note {
  const SCHEMA: &'static Schema = &KEYLESS_SCHEMA;
  const SAVE: SavePolicy = SavePolicy::GeneratedKey;

  fn bind(&self, _field: &str) -> Value { Value::Text(self.text.clone()) }

  fn from_row(row: &RowReader<'_, '_>) -> Result<Self> {
    Ok(Note { text: row.get("text")? })
  }
}

#[test]
fn entity_without_primary_key_fails_on_first_use() {
  let s = store();
  let notes = crate::Repository::<Note>::new(s.database().clone(), s.sql().clone());

  assert!(matches!(notes.find_all(), Err(Error::MissingPrimaryKey("Note"))));
  let note = Note { text: "hi".into() };
  assert!(matches!(notes.save(note), Err(Error::MissingPrimaryKey("Note"))));
}

#[test]
fn unmapped_search_field_is_rejected() {
  let s = store();
  let err = s.groups().find_by_field("colour", "red".to_owned()).unwrap_err();
  assert!(
    matches!(err, Error::UnknownField { entity: "Group", ref field } if field == "colour")
  );
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

#[test]
fn bootstrap_seeds_default_group_once() {
  let s = store();
  assert!(!s.bootstrap(&Group::new("Player", "")).unwrap());

  let all = s.groups().find_all().unwrap();
  assert_eq!(all, vec![Group { id: 1, name: "Player".into(), prefix: String::new() }]);
}

#[test]
fn bootstrap_honours_table_prefix() {
  let s = SqliteStore::open_in_memory(TablePrefix::new("srv2_")).unwrap();
  s.bootstrap(&Group::new("Guest", "G")).unwrap();

  let conn = s.database().connect().unwrap();
  let count: i64 = conn
    .query_row(
      "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'srv2_%'",
      [],
      |r| r.get(0),
    )
    .unwrap();
  assert_eq!(count, 3);
  assert_eq!(s.groups().find_first_by_name("Guest").unwrap().unwrap().prefix, "G");
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[test]
fn group_save_assigns_id_then_updates_in_place() {
  let s = store();
  let vip = saved_group(&s, "VIP", "v");
  assert!(vip.id > 1);

  let renamed = s.groups().save(Group { prefix: "V".into(), ..vip.clone() }).unwrap();
  assert_eq!(renamed.id, vip.id);

  let all = s.groups().find_all().unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(s.groups().find_by_id(vip.id).unwrap().unwrap().prefix, "V");
}

#[test]
fn group_find_first_by_name_is_case_sensitive() {
  let s = store();
  saved_group(&s, "VIP", "");
  assert!(s.groups().find_first_by_name("VIP").unwrap().is_some());
  assert!(s.groups().find_first_by_name("vip").unwrap().is_none());
}

#[test]
fn group_find_one_uses_template_key() {
  let s = store();
  let vip = saved_group(&s, "VIP", "v");
  let template = Group { id: vip.id, name: String::new(), prefix: String::new() };
  assert_eq!(s.groups().find_one(&template).unwrap(), Some(vip));
}

#[test]
fn duplicate_group_name_is_a_database_error() {
  let s = store();
  saved_group(&s, "VIP", "");
  let err = s.groups().save(Group::new("VIP", "")).unwrap_err();
  assert!(matches!(err, Error::Database(_)));
  assert!(err.is_constraint_violation());
}

// ─── Players ─────────────────────────────────────────────────────────────────

#[test]
fn player_save_is_idempotent() {
  let s = store();
  let alex = saved_player(&s, "Alex");

  let renamed = Player { display_name: "Alexandra".into(), ..alex.clone() };
  s.players().save(renamed).unwrap();

  let all = s.players().find_all().unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].display_name, "Alexandra");
  assert_eq!(all[0].created_at, alex.created_at);
}

#[test]
fn player_find_by_id_and_name() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  assert_eq!(s.players().find_by_id(alex.uuid.clone()).unwrap(), Some(alex.clone()));
  assert_eq!(s.players().find_first_by_name("Alex").unwrap(), Some(alex));
  assert!(s.players().find_by_id(Uuid::new_v4().to_string()).unwrap().is_none());
}

// ─── Memberships ─────────────────────────────────────────────────────────────

#[test]
fn membership_round_trips_through_insert_and_select() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let vip = saved_group(&s, "VIP", "★");
  let expires = Utc.timestamp_opt(1_900_000_000, 987_654_321).unwrap();

  let inserted = Membership::new(alex, vip, Some(expires), 1);
  let saved = s.memberships().save(inserted.clone()).unwrap();
  assert!(saved.id > 0);

  let loaded = s.memberships().find_by_id(saved.id).unwrap().unwrap();
  assert_eq!(loaded, Membership { id: saved.id, ..inserted });
}

#[test]
fn membership_save_always_appends() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let vip = saved_group(&s, "VIP", "");

  let first = s.memberships().save(Membership::new(alex.clone(), vip.clone(), None, 0)).unwrap();
  let second = s.memberships().save(first.clone()).unwrap();
  assert_ne!(first.id, second.id);
  assert!(second.id > first.id);

  assert_eq!(s.memberships().find_all_by_player(&alex.uuid).unwrap().len(), 2);
}

#[test]
fn membership_update_is_refused() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let vip = saved_group(&s, "VIP", "");
  let m = s.memberships().save(Membership::new(alex, vip, None, 0)).unwrap();

  let err = s.memberships().update(m).unwrap_err();
  assert!(matches!(err, Error::AppendOnly("Membership")));
}

#[test]
fn memberships_by_player_newest_first() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let bob = saved_player(&s, "Bob");
  let starter = s.groups().find_by_id(1).unwrap().unwrap();
  let vip = saved_group(&s, "VIP", "");

  let base = Utc::now();
  let mut old = Membership::new(alex.clone(), starter.clone(), None, 0);
  old.created_at = base - Duration::hours(2);
  let mut new = Membership::new(alex.clone(), vip.clone(), None, starter.id);
  new.created_at = base;
  let mut bobs = Membership::new(bob, vip, None, 0);
  bobs.created_at = base - Duration::hours(1);

  // Insert out of order to prove the ORDER BY does the work.
  s.memberships().save(new).unwrap();
  s.memberships().save(old).unwrap();
  s.memberships().save(bobs).unwrap();

  let history = s.memberships().find_all_by_player(&alex.uuid).unwrap();
  let groups: Vec<&str> = history.iter().map(|m| m.group.name.as_str()).collect();
  assert_eq!(groups, vec!["VIP", "Player"]);
  assert!(history.iter().all(|m| m.player.uuid == alex.uuid));
}

#[test]
fn memberships_with_identical_timestamps_order_by_id() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let vip = saved_group(&s, "VIP", "");
  let at = Utc::now();

  let mut a = Membership::new(alex.clone(), vip.clone(), None, 0);
  a.created_at = at;
  let mut b = a.clone();
  b.last_group_id = vip.id;
  let a = s.memberships().save(a).unwrap();
  let b = s.memberships().save(b).unwrap();

  let history = s.memberships().find_all_by_player(&alex.uuid).unwrap();
  assert_eq!(history.iter().map(|m| m.id).collect::<Vec<_>>(), vec![b.id, a.id]);
}

#[test]
fn history_in_group_is_distinct() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let bob = saved_player(&s, "Bob");
  saved_player(&s, "Carol");
  let vip = saved_group(&s, "VIP", "");

  for p in [&alex, &alex, &bob] {
    s.memberships().save(Membership::new(p.clone(), vip.clone(), None, 0)).unwrap();
  }

  let mut names: Vec<String> = s
    .players()
    .history_in_group(vip.id)
    .unwrap()
    .into_iter()
    .map(|p| p.display_name)
    .collect();
  names.sort();
  assert_eq!(names, vec!["Alex", "Bob"]);
}

#[test]
fn membership_find_by_relation_field() {
  let s = store();
  let alex = saved_player(&s, "Alex");
  let vip = saved_group(&s, "VIP", "");
  s.memberships().save(Membership::new(alex.clone(), vip.clone(), None, 0)).unwrap();

  let rows = s.memberships().find_by_field("group", vip.id).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].player, alex);
}

#[test]
fn membership_requires_existing_player() {
  let s = store();
  let vip = saved_group(&s, "VIP", "");
  let err = s
    .memberships()
    .save(Membership::new(player("Ghost"), vip, None, 0))
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}
