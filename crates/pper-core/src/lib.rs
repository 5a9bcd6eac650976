//! Core types for the pper group membership system.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! The store and service crates depend on it.

pub mod duration;
pub mod error;
pub mod group;
pub mod membership;
pub mod player;

pub use error::{Error, Result};
