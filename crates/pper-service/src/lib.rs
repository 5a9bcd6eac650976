//! Membership resolution, caching and expiry for pper.
//!
//! Wires the SQLite repositories to two in-memory caches: a build-on-miss
//! catalog of groups and a write-through cache of active-membership
//! snapshots. [`Sweeper`] periodically re-resolves snapshots whose
//! membership has expired.

pub mod app;
pub mod cache;
pub mod error;
pub mod groups;
pub mod memberships;
pub mod notify;
pub mod settings;
pub mod sweeper;

pub use app::App;
pub use cache::{GroupCache, MembershipCache};
pub use error::{Error, Result};
pub use groups::GroupService;
pub use memberships::MembershipService;
pub use notify::{LogNotifier, Notifier};
pub use settings::Settings;
pub use sweeper::{SweepReport, Sweeper, SweeperHandle};
