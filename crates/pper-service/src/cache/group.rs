//! Build-on-miss catalog of groups keyed by id.

use std::sync::Arc;

use moka::sync::Cache;
use pper_core::group::Group;

use crate::{Error, Result, settings::CacheSettings};

#[derive(Clone)]
pub struct GroupCache {
  inner: Cache<i64, Group>,
}

impl GroupCache {
  pub fn new(settings: &CacheSettings) -> Self {
    let inner = Cache::builder()
      .max_capacity(settings.capacity)
      .time_to_live(settings.ttl())
      .build();
    Self { inner }
  }

  /// Insert every group; used to warm the cache at startup.
  pub fn load_all(&self, groups: impl IntoIterator<Item = Group>) -> usize {
    let mut n = 0;
    for group in groups {
      self.put(group);
      n += 1;
    }
    n
  }

  /// Cached entry only; never touches the store.
  pub fn get_by_id(&self, id: i64) -> Option<Group> { self.inner.get(&id) }

  /// Cached entry, or the result of `load` inserted for next time.
  ///
  /// Concurrent misses on the same id run `load` once and share its result.
  /// An absent group is not cached.
  pub fn get_or_load<F>(&self, id: i64, load: F) -> Result<Option<Group>>
  where
    F: FnOnce(i64) -> Result<Option<Group>>,
  {
    let loaded = self.inner.try_get_with(id, || {
      load(id)?.ok_or(Error::Core(pper_core::Error::UnknownGroupId(id)))
    });

    match loaded {
      Ok(group) => Ok(Some(group)),
      Err(e) if is_absent(&e, id) => Ok(None),
      Err(e) => Err(Arc::try_unwrap(e).unwrap_or_else(Error::Load)),
    }
  }

  /// First cached group named exactly `name`.
  pub fn find_cached_by_name(&self, name: &str) -> Option<Group> {
    self.inner.iter().map(|(_, g)| g).find(|g| g.name == name)
  }

  /// Scan the cache for `name`; on a miss ask `fallback` and cache its hit.
  pub fn get_by_name<F>(&self, name: &str, fallback: F) -> Result<Group>
  where
    F: FnOnce(&str) -> Result<Option<Group>>,
  {
    if let Some(group) = self.find_cached_by_name(name) {
      return Ok(group);
    }
    tracing::debug!(group = name, "catalog miss, asking the store");
    match fallback(name)? {
      Some(group) => {
        self.put(group.clone());
        Ok(group)
      }
      None => Err(pper_core::Error::GroupNotFound(name.to_owned()).into()),
    }
  }

  /// Every cached group, in no particular order.
  pub fn get_all(&self) -> Vec<Group> { self.inner.iter().map(|(_, g)| g).collect() }

  pub fn put(&self, group: Group) { self.inner.insert(group.id, group); }

  pub fn remove_by_id(&self, id: i64) { self.inner.invalidate(&id); }

  /// Apply pending evictions; entry counts are approximate until then.
  pub fn sync(&self) { self.inner.run_pending_tasks(); }
}

fn is_absent(e: &Error, id: i64) -> bool {
  matches!(e, Error::Core(pper_core::Error::UnknownGroupId(missing)) if *missing == id)
}

impl std::fmt::Debug for GroupCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GroupCache")
      .field("entries", &self.inner.entry_count())
      .finish()
  }
}
