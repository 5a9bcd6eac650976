//! SQLite backend for pper.
//!
//! A small descriptor-driven mapper: each entity declares a static
//! [`Schema`], [`SqlGenerator`] turns schemas into parameterised statements
//! and [`RowReader`] maps aliased result columns back into entities.
//! Repositories open a fresh connection per call and never hold a
//! transaction across calls.

mod database;
mod encode;
mod entities;
mod prefix;
mod repository;
mod row;
mod schema;
mod sql;
mod store;

pub mod error;
pub mod meta;

pub use database::Database;
pub use entities::{GROUP_SCHEMA, MEMBERSHIP_SCHEMA, PLAYER_SCHEMA};
pub use error::{Error, Result};
pub use meta::{Column, Entity, Relation, SavePolicy, Schema};
pub use prefix::{DEFAULT_TABLE_PREFIX, TablePrefix};
pub use repository::{
  GroupRepository, MembershipRepository, PlayerRepository, Repository,
};
pub use row::RowReader;
pub use sql::{Select, SqlGenerator, Statement};
pub use store::SqliteStore;

pub use rusqlite::types::Value;

#[cfg(test)]
mod tests;
