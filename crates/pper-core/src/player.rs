//! Players: the actors whose membership is tracked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A uniquely identified participant.
///
/// `uuid` is the stable external identity; `display_name` may change between
/// sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub uuid:         String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

impl Player {
  /// Build a player from the identity the host reports on connect.
  pub fn from_identity(uuid: Uuid, display_name: impl Into<String>) -> Self {
    Self {
      uuid:         uuid.hyphenated().to_string(),
      display_name: display_name.into(),
      created_at:   Utc::now(),
    }
  }
}
