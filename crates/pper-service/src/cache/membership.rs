//! Active-membership snapshots keyed by player uuid.
//!
//! Write-through only: the membership service puts a snapshot after every
//! resolve or assignment, and the sweeper removes expired ones. Nothing here
//! reads the store.

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use pper_core::membership::ActiveMembership;

use crate::{Result, settings::CacheSettings};

#[derive(Clone)]
pub struct MembershipCache {
  inner: Cache<String, ActiveMembership>,
}

impl MembershipCache {
  pub fn new(settings: &CacheSettings) -> Self {
    let inner = Cache::builder()
      .max_capacity(settings.capacity)
      .time_to_live(settings.ttl())
      .build();
    Self { inner }
  }

  pub fn get_by_id(&self, uuid: &str) -> Option<ActiveMembership> {
    self.inner.get(uuid)
  }

  /// First cached snapshot whose player is named exactly `name`.
  pub fn get_by_name(&self, name: &str) -> Result<ActiveMembership> {
    self
      .inner
      .iter()
      .map(|(_, s)| s)
      .find(|s| s.player_name == name)
      .ok_or_else(|| pper_core::Error::PlayerNotFound(name.to_owned()).into())
  }

  pub fn get_all(&self) -> Vec<ActiveMembership> {
    self.inner.iter().map(|(_, s)| s).collect()
  }

  /// Snapshots whose expiry is at or before `now`.
  pub fn expired_at(&self, now: DateTime<Utc>) -> Vec<ActiveMembership> {
    self
      .inner
      .iter()
      .map(|(_, s)| s)
      .filter(|s| s.is_expired_at(now))
      .collect()
  }

  pub fn put(&self, snapshot: ActiveMembership) {
    self.inner.insert(snapshot.player_uuid.clone(), snapshot);
  }

  pub fn remove_by_id(&self, uuid: &str) { self.inner.invalidate(uuid); }

  pub fn sync(&self) { self.inner.run_pending_tasks(); }
}

impl std::fmt::Debug for MembershipCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MembershipCache")
      .field("entries", &self.inner.entry_count())
      .finish()
  }
}
