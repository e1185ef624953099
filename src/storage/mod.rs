//! Storage layer for the league database
//!
//! This module provides a thin abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Data structures, one per persisted entity
//! - `schema`: Database connection, schema and transaction management
//! - `queries`: Per-entity read/insert/update/delete operations

pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

// Re-export the main types and database struct for easy access
pub use models::*;
pub use schema::LeagueDatabase;
