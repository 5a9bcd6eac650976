//! Memberships and the cached active-membership snapshot.
//!
//! Memberships are strictly append-only: changing a player's group inserts a
//! new row that records the group it replaces. A membership is active while
//! its expiry is absent or still in the future; among a player's history the
//! most recently created active membership wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{group::Group, player::Player};

// ─── Membership ──────────────────────────────────────────────────────────────

/// One row of a player's membership history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
  /// Store-assigned identity; `0` until inserted.
  pub id:            i64,
  pub player:        Player,
  pub group:         Group,
  /// `None` means permanent.
  pub expires_at:    Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
  /// Group held before this membership was added, `0` if none.
  pub last_group_id: i64,
}

impl Membership {
  /// A not-yet-inserted membership created now.
  pub fn new(
    player: Player,
    group: Group,
    expires_at: Option<DateTime<Utc>>,
    last_group_id: i64,
  ) -> Self {
    Self {
      id: 0,
      player,
      group,
      expires_at,
      created_at: Utc::now(),
      last_group_id,
    }
  }

  /// Active iff there is no expiry or the expiry is strictly after `now`.
  pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_none_or(|exp| exp > now)
  }
}

/// Pick the active membership from a history sorted newest first.
pub fn first_active(
  history: &[Membership],
  now: DateTime<Utc>,
) -> Option<&Membership> {
  history.iter().find(|m| m.is_active_at(now))
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Denormalised read model of a player's active membership.
///
/// Lives only in the membership cache; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMembership {
  pub player_uuid:   String,
  pub player_name:   String,
  pub membership_id: i64,
  pub group_id:      i64,
  pub group_name:    String,
  pub group_prefix:  String,
  pub expires_at:    Option<DateTime<Utc>>,
  pub last_group_id: i64,
  /// When the membership (not the snapshot) was created.
  pub since:         DateTime<Utc>,
}

impl ActiveMembership {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|exp| exp <= now)
  }

  /// The snapshot with a new group prefix, everything else unchanged.
  pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
    Self { group_prefix: prefix.into(), ..self.clone() }
  }

  /// `[prefix]` for chat and join lines, or an empty string.
  pub fn display_prefix(&self) -> String {
    if self.group_prefix.is_empty() {
      String::new()
    } else {
      format!("[{}]", self.group_prefix)
    }
  }
}

impl From<&Membership> for ActiveMembership {
  fn from(m: &Membership) -> Self {
    Self {
      player_uuid:   m.player.uuid.clone(),
      player_name:   m.player.display_name.clone(),
      membership_id: m.id,
      group_id:      m.group.id,
      group_name:    m.group.name.clone(),
      group_prefix:  m.group.prefix.clone(),
      expires_at:    m.expires_at,
      last_group_id: m.last_group_id,
      since:         m.created_at,
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// Reported when an expired membership is replaced by whatever resolves next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTransition {
  pub player_uuid: String,
  pub player_name: String,
  pub from_group:  String,
  /// `None` when the player is left without an active membership.
  pub to_group:    Option<String>,
}
