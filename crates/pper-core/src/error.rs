//! Error types for `pper-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("group not found: {0:?}")]
  GroupNotFound(String),

  #[error("group id not found: {0}")]
  UnknownGroupId(i64),

  #[error("group already exists: {0:?}")]
  GroupAlreadyExists(String),

  /// The name lookup only covers players whose snapshot is currently cached.
  #[error("player not found: {0:?}")]
  PlayerNotFound(String),

  #[error("invalid duration token: {0:?}")]
  InvalidDuration(String),
}

impl Error {
  /// `true` for the recoverable not-found conditions.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::GroupNotFound(_) | Self::UnknownGroupId(_) | Self::PlayerNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
