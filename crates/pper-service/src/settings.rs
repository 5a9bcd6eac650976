//! Runtime settings, layered from `pper.toml` and `PPER_*` variables.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Nested keys use a double underscore in the environment:
//! `PPER_GROUP_CACHE__CAPACITY=500`.

use std::{path::PathBuf, time::Duration};

use config::{Config, Environment, File, FileFormat};
use pper_core::group::Group;
use pper_store_sqlite::{DEFAULT_TABLE_PREFIX, TablePrefix};
use serde::Deserialize;

use crate::Result;

pub const ENV_PREFIX: &str = "PPER";

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path:    PathBuf,
  pub table_prefix:     String,
  pub default_group:    DefaultGroup,
  pub group_cache:      GroupCacheSettings,
  pub membership_cache: MembershipCacheSettings,
  pub sweeper:          SweeperSettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path:    PathBuf::from("pper.sqlite3"),
      table_prefix:     DEFAULT_TABLE_PREFIX.to_owned(),
      default_group:    DefaultGroup::default(),
      group_cache:      GroupCacheSettings::default(),
      membership_cache: MembershipCacheSettings::default(),
      sweeper:          SweeperSettings::default(),
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `PPER_*` overrides.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let settings = Config::builder()
      .add_source(File::from(path.into()).required(false))
      .add_source(env_source())
      .build()?
      .try_deserialize()?;
    Ok(settings)
  }

  /// Parse TOML text without consulting the environment.
  pub fn from_toml(text: &str) -> Result<Self> {
    let settings = Config::builder()
      .add_source(File::from_str(text, FileFormat::Toml))
      .build()?
      .try_deserialize()?;
    Ok(settings)
  }

  /// The validated prefix; invalid values fall back to the default.
  pub fn table_prefix(&self) -> TablePrefix { TablePrefix::new(&self.table_prefix) }
}

fn env_source() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// The group every player falls back to. Seeded under id 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultGroup {
  pub name:   String,
  pub prefix: String,
}

impl Default for DefaultGroup {
  fn default() -> Self { Self { name: "Player".to_owned(), prefix: String::new() } }
}

impl DefaultGroup {
  pub fn group(&self) -> Group { Group::new(self.name.clone(), self.prefix.clone()) }
}

const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Size and lifetime of one cache, shared by both cache sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
  pub capacity: u64,
  pub ttl_secs: u64,
}

impl CacheSettings {
  pub fn with_capacity(capacity: u64) -> Self {
    Self { capacity, ttl_secs: DEFAULT_TTL_SECS }
  }

  pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }
}

/// `[group_cache]`; 1,000 entries by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupCacheSettings {
  pub capacity: u64,
  pub ttl_secs: u64,
}

impl Default for GroupCacheSettings {
  fn default() -> Self { Self { capacity: 1_000, ttl_secs: DEFAULT_TTL_SECS } }
}

impl GroupCacheSettings {
  pub fn cache(&self) -> CacheSettings {
    CacheSettings { capacity: self.capacity, ttl_secs: self.ttl_secs }
  }
}

/// `[membership_cache]`; 10,000 entries by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MembershipCacheSettings {
  pub capacity: u64,
  pub ttl_secs: u64,
}

impl Default for MembershipCacheSettings {
  fn default() -> Self { Self { capacity: 10_000, ttl_secs: DEFAULT_TTL_SECS } }
}

impl MembershipCacheSettings {
  pub fn cache(&self) -> CacheSettings {
    CacheSettings { capacity: self.capacity, ttl_secs: self.ttl_secs }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SweeperSettings {
  pub interval_ms:     u64,
  /// Pause between re-resolving an entry and notifying about it.
  pub notify_delay_ms: Option<u64>,
}

impl Default for SweeperSettings {
  fn default() -> Self { Self { interval_ms: 1_000, notify_delay_ms: None } }
}

impl SweeperSettings {
  pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms.max(1)) }

  pub fn notify_delay(&self) -> Option<Duration> {
    self.notify_delay_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let s = Settings::from_toml("").unwrap();
    assert_eq!(s.table_prefix, "pper_");
    assert_eq!(s.default_group.name, "Player");
    assert_eq!(s.group_cache.capacity, 1_000);
    assert_eq!(s.membership_cache.capacity, 10_000);
    assert_eq!(s.group_cache.cache().ttl(), Duration::from_secs(3_600));
    assert_eq!(s.sweeper.interval(), Duration::from_secs(1));
    assert_eq!(s.sweeper.notify_delay(), None);
  }

  #[test]
  fn sections_override_defaults() {
    let s = Settings::from_toml(
      r#"
        table_prefix = "perm_"

        [default_group]
        name = "Guest"

        [membership_cache]
        capacity = 50

        [sweeper]
        notify_delay_ms = 100
      "#,
    )
    .unwrap();

    assert_eq!(s.table_prefix().as_str(), "perm_");
    assert_eq!(s.default_group, DefaultGroup {
      name:   "Guest".into(),
      prefix: String::new(),
    });
    assert_eq!(s.membership_cache.cache(), CacheSettings::with_capacity(50));
    assert_eq!(s.group_cache.capacity, 1_000);
    assert_eq!(s.sweeper.notify_delay(), Some(Duration::from_millis(100)));
  }

  #[test]
  fn partial_cache_section_keeps_section_defaults() {
    let s = Settings::from_toml(
      r#"
        [group_cache]
        ttl_secs = 10

        [membership_cache]
        ttl_secs = 20
      "#,
    )
    .unwrap();

    assert_eq!(s.group_cache, GroupCacheSettings { capacity: 1_000, ttl_secs: 10 });
    assert_eq!(s.membership_cache, MembershipCacheSettings {
      capacity: 10_000,
      ttl_secs: 20,
    });
  }

  #[test]
  fn invalid_prefix_falls_back() {
    let s = Settings::from_toml(r#"table_prefix = "drop table;""#).unwrap();
    assert_eq!(s.table_prefix().as_str(), "pper_");
  }
}
