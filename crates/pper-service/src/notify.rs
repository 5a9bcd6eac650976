//! Delivery of expiry notices to whoever hosts the players.

use pper_core::membership::GroupTransition;

/// Receives one call per expired membership the sweeper re-resolved.
pub trait Notifier: Send + Sync {
  fn membership_expired(&self, transition: &GroupTransition);
}

impl<F> Notifier for F
where
  F: Fn(&GroupTransition) + Send + Sync,
{
  fn membership_expired(&self, transition: &GroupTransition) { self(transition) }
}

/// Writes each transition to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn membership_expired(&self, t: &GroupTransition) {
    match &t.to_group {
      Some(to) => tracing::info!(
        player = %t.player_name,
        from = %t.from_group,
        to = %to,
        "membership expired"
      ),
      None => tracing::info!(
        player = %t.player_name,
        from = %t.from_group,
        "membership expired, no active group left"
      ),
    }
  }
}
