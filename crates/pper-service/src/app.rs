//! Wiring: store, caches and services built from [`Settings`].

use std::sync::Arc;

use pper_store_sqlite::SqliteStore;

use crate::{
  Result,
  cache::{GroupCache, MembershipCache},
  groups::GroupService,
  memberships::MembershipService,
  notify::Notifier,
  settings::Settings,
  sweeper::Sweeper,
};

/// Everything a host needs, sharing one store and one pair of caches.
#[derive(Debug, Clone)]
pub struct App {
  pub store:       SqliteStore,
  pub groups:      Arc<GroupService>,
  pub memberships: Arc<MembershipService>,
  pub settings:    Arc<Settings>,
}

impl App {
  /// Open the configured database, create the schema and warm the catalog.
  ///
  /// Any failure here is fatal for the host.
  pub fn open(settings: Settings) -> Result<Self> {
    let store = SqliteStore::open(&settings.database_path, settings.table_prefix())?;
    Self::with_store(store, settings)
  }

  /// Like [`open`](Self::open) but on an already opened store.
  pub fn with_store(store: SqliteStore, settings: Settings) -> Result<Self> {
    store.bootstrap(&settings.default_group.group())?;

    let catalog = Arc::new(GroupCache::new(&settings.group_cache.cache()));
    let snapshots = Arc::new(MembershipCache::new(&settings.membership_cache.cache()));

    let groups = Arc::new(GroupService::new(&store, catalog, Arc::clone(&snapshots)));
    groups.load_catalog()?;

    let memberships = Arc::new(MembershipService::new(
      &store,
      snapshots,
      Arc::clone(&groups),
      settings.default_group.clone(),
    ));

    tracing::info!(prefix = %store.prefix(), "pper ready");
    Ok(Self { store, groups, memberships, settings: Arc::new(settings) })
  }

  pub fn sweeper(&self, notifier: Arc<dyn Notifier>) -> Sweeper {
    Sweeper::new(Arc::clone(&self.memberships), notifier, &self.settings.sweeper)
  }
}
