//! Database module
//!
//! Handles SQLite connection pooling and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DatabaseLocation, DbError, DbResult};
