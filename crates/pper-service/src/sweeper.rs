//! Periodic expiry sweep over the membership cache.
//!
//! Each pass collects the cached snapshots whose expiry is at or before "now",
//! evicts them, re-resolves the player from the store and reports the
//! transition. A failure on one entry is logged and the pass moves on.

use std::{sync::Arc, thread, time::Duration};

use chrono::{DateTime, Utc};
use pper_core::membership::{ActiveMembership, GroupTransition};
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::{
  Result, memberships::MembershipService, notify::Notifier, settings::SweeperSettings,
};

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
  pub transitions: Vec<GroupTransition>,
  pub failures:    usize,
}

impl SweepReport {
  pub fn is_empty(&self) -> bool { self.transitions.is_empty() && self.failures == 0 }
}

pub struct Sweeper {
  service:      Arc<MembershipService>,
  notifier:     Arc<dyn Notifier>,
  interval:     Duration,
  notify_delay: Option<Duration>,
}

impl Sweeper {
  pub fn new(
    service: Arc<MembershipService>,
    notifier: Arc<dyn Notifier>,
    settings: &SweeperSettings,
  ) -> Self {
    Self {
      service,
      notifier,
      interval: settings.interval(),
      notify_delay: settings.notify_delay(),
    }
  }

  pub fn interval(&self) -> Duration { self.interval }

  pub fn sweep(&self) -> SweepReport { self.sweep_at(Utc::now()) }

  /// One pass treating `now` as the current instant for the expiry filter.
  ///
  /// Blocks on the store and on the notify delay; run it off the async
  /// runtime.
  pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
    let mut report = SweepReport::default();

    for stale in self.service.cache().expired_at(now) {
      match self.replace(&stale) {
        Ok(transition) => {
          if let Some(delay) = self.notify_delay {
            thread::sleep(delay);
          }
          self.notifier.membership_expired(&transition);
          report.transitions.push(transition);
        }
        Err(e) => {
          tracing::warn!(
            player = %stale.player_uuid,
            group = %stale.group_name,
            error = %e,
            "could not re-resolve expired membership"
          );
          report.failures += 1;
        }
      }
    }
    report
  }

  fn replace(&self, stale: &ActiveMembership) -> Result<GroupTransition> {
    self.service.remove_from_cache(&stale.player_uuid);
    let next = self.service.resolve_active(&stale.player_uuid)?;
    Ok(GroupTransition {
      player_uuid: stale.player_uuid.clone(),
      player_name: stale.player_name.clone(),
      from_group:  stale.group_name.clone(),
      to_group:    next.map(|s| s.group_name),
    })
  }

  // ── Background task ───────────────────────────────────────────────────────

  /// Run a pass every interval on the current tokio runtime.
  ///
  /// Passes never overlap: a slow pass delays the next tick instead of
  /// queueing extra ones. Dropping the handle stops the task after the
  /// current pass.
  pub fn spawn(self) -> SweeperHandle {
    let (stop, mut stopped) = watch::channel(false);
    let sweeper = Arc::new(self);

    let task = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(sweeper.interval);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      tracing::info!(interval = ?sweeper.interval, "expiry sweeper started");

      loop {
        tokio::select! {
          _ = ticker.tick() => {}
          _ = stopped.changed() => break,
        }

        let pass = Arc::clone(&sweeper);
        match tokio::task::spawn_blocking(move || pass.sweep()).await {
          Ok(report) if !report.is_empty() => tracing::debug!(
            expired = report.transitions.len(),
            failures = report.failures,
            "sweep finished"
          ),
          Ok(_) => {}
          Err(e) => tracing::error!(error = %e, "sweep pass aborted"),
        }
      }
      tracing::info!("expiry sweeper stopped");
    });

    SweeperHandle { stop, task }
  }
}

impl std::fmt::Debug for Sweeper {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Sweeper")
      .field("interval", &self.interval)
      .field("notify_delay", &self.notify_delay)
      .finish_non_exhaustive()
  }
}

#[derive(Debug)]
pub struct SweeperHandle {
  stop: watch::Sender<bool>,
  task: JoinHandle<()>,
}

impl SweeperHandle {
  /// Signal the task and wait for the running pass to finish.
  pub async fn shutdown(self) {
    // The receiver is gone only if the task already exited.
    let _ = self.stop.send(true);
    if let Err(e) = self.task.await {
      tracing::error!(error = %e, "expiry sweeper task failed");
    }
  }
}
