//! Fantasy Basketball League Data Reconciliation
//!
//! Keeps a local SQLite store of a fantasy basketball league in step with its
//! upstream sources: fantasy teams, NBA teams, the player pool and salaries,
//! fantasy rosters, the NBA schedule, weekly match-ups and per-game box scores.
//!
//! ## Features
//!
//! - **Identity Resolution**: incoming player names are matched to canonical
//!   players by exact name, then recorded alias, then normalized form
//! - **Upserts**: mutable entities are updated field by field; schedule,
//!   match-ups and game logs are append-only
//! - **Phased Runs**: fixed dependency order, one transaction per phase,
//!   bounded retries on transient fetch failures
//! - **Run Summary**: per-entity counts plus every ambiguity and dangling
//!   reference that needs attention
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hoops_sync::{
//!     config::SeasonContext,
//!     feed::SnapshotFeed,
//!     reconcile::{Reconciler, RunOptions},
//!     storage::LeagueDatabase,
//!     Season,
//! };
//!
//! # async fn example() -> hoops_sync::Result<()> {
//! let db = LeagueDatabase::open("league.db".as_ref())?;
//! let feed = SnapshotFeed::new("snapshots/2026-01-15");
//! let ctx = SeasonContext::new(Season::new(2026), chrono::Local::now().date_naive());
//!
//! let summary = Reconciler::new(&db, &feed, &ctx)
//!     .update_mid_season(RunOptions::default())
//!     .await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export HOOPS_SYNC_LEAGUE_ID=123456
//! export HOOPS_SYNC_API_URL=https://feed.example.com/v1
//! export HOOPS_SYNC_API_TOKEN=...
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod feed;
pub mod reconcile;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{FantasyTeamId, LeagueId, NbaTeamId, Phase, PlayerId, Position, Season, Week};
pub use config::{HoopsConfig, SeasonContext, LEAGUE_ID_ENV_VAR};
pub use error::{Result, SyncError};
pub use reconcile::{Reconciler, RunOptions, RunSummary};
