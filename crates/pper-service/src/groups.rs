//! Group catalog operations.

use std::sync::Arc;

use pper_core::{group::Group, player::Player};
use pper_store_sqlite::{GroupRepository, PlayerRepository, SqliteStore};

use crate::{
  Result,
  cache::{GroupCache, MembershipCache},
};

/// Creates and edits groups, keeping the catalog cache and any cached
/// snapshots that mention a group in step with the store.
#[derive(Debug, Clone)]
pub struct GroupService {
  groups:    GroupRepository,
  players:   PlayerRepository,
  catalog:   Arc<GroupCache>,
  snapshots: Arc<MembershipCache>,
}

impl GroupService {
  pub fn new(
    store: &SqliteStore,
    catalog: Arc<GroupCache>,
    snapshots: Arc<MembershipCache>,
  ) -> Self {
    Self { groups: store.groups(), players: store.players(), catalog, snapshots }
  }

  pub fn catalog(&self) -> &GroupCache { &self.catalog }

  /// Warm the catalog with every stored group.
  pub fn load_catalog(&self) -> Result<usize> {
    let n = self.catalog.load_all(self.groups.find_all()?);
    tracing::info!(groups = n, "loaded group catalog");
    Ok(n)
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  /// Exact, case-sensitive name lookup; the store is consulted on a miss.
  pub fn group_by_name(&self, name: &str) -> Result<Group> {
    self
      .catalog
      .get_by_name(name, |n| Ok(self.groups.find_first_by_name(n)?))
  }

  pub fn group_by_id(&self, id: i64) -> Result<Option<Group>> {
    self
      .catalog
      .get_or_load(id, |id| Ok(self.groups.find_by_id(id)?))
  }

  /// Cached groups only.
  pub fn all_groups(&self) -> Vec<Group> {
    let mut groups = self.catalog.get_all();
    groups.sort_by_key(|g| g.id);
    groups
  }

  /// Everyone who has ever held the group, current or not.
  pub fn players_in_group(&self, name: &str) -> Result<Vec<Player>> {
    let group = self.group_by_name(name)?;
    Ok(self.players.history_in_group(group.id)?)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Persist a new group and cache it.
  ///
  /// Fails with `GroupAlreadyExists` if the name is taken; nothing is written
  /// or cached in that case.
  pub fn create(&self, name: &str, prefix: &str) -> Result<Group> {
    match self.group_by_name(name) {
      Ok(_) => return Err(pper_core::Error::GroupAlreadyExists(name.to_owned()).into()),
      Err(e) if e.is_not_found() => {}
      Err(e) => return Err(e),
    }

    self.insert_new(name, prefix)
  }

  /// Insert and cache a group. A concurrent create of the same name that
  /// won the race surfaces as `GroupAlreadyExists`.
  pub(crate) fn insert_new(&self, name: &str, prefix: &str) -> Result<Group> {
    let group = match self.groups.save(Group::new(name, prefix)) {
      Ok(group) => group,
      Err(e) if e.is_constraint_violation() => {
        return Err(pper_core::Error::GroupAlreadyExists(name.to_owned()).into());
      }
      Err(e) => return Err(e.into()),
    };
    self.catalog.put(group.clone());
    tracing::info!(group = %group.name, id = group.id, "created group");
    Ok(group)
  }

  /// Change a group's prefix in the store, the catalog and every cached
  /// snapshot that currently shows the group.
  pub fn update_prefix(&self, name: &str, prefix: &str) -> Result<Group> {
    let current = self.group_by_name(name)?;
    let group = self
      .groups
      .update(Group { prefix: prefix.to_owned(), ..current })?;
    self.catalog.put(group.clone());

    let mut rewritten = 0;
    for snapshot in self.snapshots.get_all() {
      if snapshot.group_name != group.name {
        continue;
      }
      // Skip entries replaced since the scan started.
      let unchanged = self
        .snapshots
        .get_by_id(&snapshot.player_uuid)
        .is_some_and(|now| now.membership_id == snapshot.membership_id);
      if unchanged {
        self.snapshots.put(snapshot.with_prefix(&group.prefix));
        rewritten += 1;
      }
    }

    tracing::info!(group = %group.name, prefix = %group.prefix, rewritten, "updated group prefix");
    Ok(group)
  }
}
