//! Error type for `pper-service`.

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] pper_core::Error),

  #[error("store error: {0}")]
  Store(#[from] pper_store_sqlite::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  /// A catalog load failed and the failure is shared with other callers
  /// that waited on the same key.
  #[error("group load failed: {0}")]
  Load(#[source] Arc<Error>),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    match self {
      Self::Core(e) => e.is_not_found(),
      Self::Load(e) => e.is_not_found(),
      _ => false,
    }
  }

  pub fn is_already_exists(&self) -> bool {
    matches!(self, Self::Core(pper_core::Error::GroupAlreadyExists(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
