//! Player registration and active-membership resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pper_core::{
  group::Group,
  membership::{ActiveMembership, Membership, first_active},
  player::Player,
};
use pper_store_sqlite::{MembershipRepository, PlayerRepository, SqliteStore};
use uuid::Uuid;

use crate::{
  Result, cache::MembershipCache, groups::GroupService, settings::DefaultGroup,
};

#[derive(Debug, Clone)]
pub struct MembershipService {
  players:       PlayerRepository,
  memberships:   MembershipRepository,
  cache:         Arc<MembershipCache>,
  groups:        Arc<GroupService>,
  default_group: DefaultGroup,
}

impl MembershipService {
  pub fn new(
    store: &SqliteStore,
    cache: Arc<MembershipCache>,
    groups: Arc<GroupService>,
    default_group: DefaultGroup,
  ) -> Self {
    Self {
      players: store.players(),
      memberships: store.memberships(),
      cache,
      groups,
      default_group,
    }
  }

  pub fn cache(&self) -> &MembershipCache { &self.cache }

  pub fn groups(&self) -> &GroupService { &self.groups }

  /// The player entity for a connecting identity. Nothing is stored.
  pub fn to_player(uuid: Uuid, display_name: &str) -> Player {
    Player::from_identity(uuid, display_name)
  }

  // ── Players ───────────────────────────────────────────────────────────────

  pub fn find_player(&self, uuid: &str) -> Result<Option<Player>> {
    Ok(self.players.find_by_id(uuid.to_owned())?)
  }

  pub fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
    Ok(self.players.find_first_by_name(name)?)
  }

  /// Store `player` if unknown, otherwise record a changed display name.
  /// The first-seen timestamp is never overwritten.
  pub fn register(&self, player: Player) -> Result<Player> {
    match self.players.find_one(&player)? {
      None => {
        let player = self.players.save(player)?;
        tracing::info!(player = %player.uuid, name = %player.display_name, "registered player");
        Ok(player)
      }
      Some(stored) if stored.display_name != player.display_name => {
        tracing::debug!(
          player = %stored.uuid,
          from = %stored.display_name,
          to = %player.display_name,
          "display name changed"
        );
        Ok(self.players.update(Player { display_name: player.display_name, ..stored })?)
      }
      Some(stored) => Ok(stored),
    }
  }

  // ── Memberships ───────────────────────────────────────────────────────────

  /// The player's active membership, served from the cache when present.
  ///
  /// On a miss the full history is read newest first and the first active
  /// entry is cached. `None` means no active membership, and nothing is
  /// cached.
  pub fn resolve_active(&self, uuid: &str) -> Result<Option<ActiveMembership>> {
    if let Some(snapshot) = self.cache.get_by_id(uuid) {
      tracing::debug!(player = uuid, "membership cache hit");
      return Ok(Some(snapshot));
    }
    tracing::debug!(player = uuid, "membership cache miss");

    let history = self.memberships.find_all_by_player(uuid)?;
    let Some(active) = first_active(&history, Utc::now()) else {
      tracing::debug!(player = uuid, rows = history.len(), "no active membership");
      return Ok(None);
    };

    let snapshot = ActiveMembership::from(active);
    self.cache.put(snapshot.clone());
    Ok(Some(snapshot))
  }

  /// Append a membership in `group` and make it the cached snapshot.
  ///
  /// The replaced group is recorded as `last_group_id`, `0` if the player
  /// had no active membership.
  pub fn add_membership(
    &self,
    player: &Player,
    group: &Group,
    expires_at: Option<DateTime<Utc>>,
  ) -> Result<ActiveMembership> {
    let last_group_id = self
      .resolve_active(&player.uuid)?
      .map_or(0, |current| current.group_id);

    let membership = self.memberships.save(Membership::new(
      player.clone(),
      group.clone(),
      expires_at,
      last_group_id,
    ))?;
    tracing::info!(
      player = %player.uuid,
      group = %group.name,
      expires_at = ?expires_at,
      last_group_id,
      "added membership"
    );

    let snapshot = ActiveMembership::from(&membership);
    self.cache.put(snapshot.clone());
    Ok(snapshot)
  }

  /// A player's full history, newest first.
  pub fn history(&self, uuid: &str) -> Result<Vec<Membership>> {
    Ok(self.memberships.find_all_by_player(uuid)?)
  }

  pub fn remove_from_cache(&self, uuid: &str) { self.cache.remove_by_id(uuid); }

  /// Cached snapshot of the first online player named `name`.
  pub fn cached_by_name(&self, name: &str) -> Result<ActiveMembership> {
    self.cache.get_by_name(name)
  }

  // ── Connect flow ──────────────────────────────────────────────────────────

  /// Register a connecting player and make sure they hold a membership.
  ///
  /// A player without an active membership is put in the default group. If
  /// that group is missing from the store a warning is logged and the player
  /// is left without one.
  pub fn ensure_active(&self, player: Player) -> Result<Option<ActiveMembership>> {
    let player = self.register(player)?;

    if let Some(snapshot) = self.resolve_active(&player.uuid)? {
      if snapshot.player_name == player.display_name {
        return Ok(Some(snapshot));
      }
      let renamed = ActiveMembership { player_name: player.display_name.clone(), ..snapshot };
      self.cache.put(renamed.clone());
      return Ok(Some(renamed));
    }

    let group = match self.groups.group_by_name(&self.default_group.name) {
      Ok(group) => group,
      Err(e) if e.is_not_found() => {
        tracing::warn!(
          player = %player.uuid,
          group = %self.default_group.name,
          "default group missing, player left without a membership"
        );
        return Ok(None);
      }
      Err(e) => return Err(e),
    };

    self.add_membership(&player, &group, None).map(Some)
  }
}
