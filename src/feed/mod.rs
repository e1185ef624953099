//! Upstream data sources.
//!
//! A [`LeagueFeed`] hands the reconciler one listing per entity type. Every
//! listing is fetched whole; the outer `Result` is the fetch itself, the
//! inner one is each row's normalization into a fixed-field record.

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod raw;
pub mod records;
pub mod snapshot;

pub use http::HttpFeed;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryFeed;
pub use records::*;
pub use snapshot::SnapshotFeed;

use crate::cli::types::Season;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Rows of one fetched listing, each normalized or failed on its own.
pub type Listing<T> = Vec<Result<T>>;

/// Where league data comes from.
#[async_trait]
pub trait LeagueFeed: Send + Sync {
    /// Short label used in logs and fetch errors
    fn source_name(&self) -> &str;

    async fn fantasy_teams(&self) -> Result<Listing<FantasyTeamRecord>>;

    async fn nba_teams(&self) -> Result<Listing<NbaTeamRecord>>;

    async fn players(&self) -> Result<Listing<PlayerRecord>>;

    async fn salaries(&self, season: Season) -> Result<Listing<SalaryRecord>>;

    async fn rosters(&self) -> Result<Listing<RosterRecord>>;

    async fn schedule(&self, season: Season) -> Result<Listing<ScheduleRecord>>;

    async fn match_ups(&self) -> Result<Listing<MatchUpRecord>>;

    /// Box scores for every game played on `date`. A date without games is
    /// an empty listing, not an error.
    async fn box_scores(&self, date: NaiveDate) -> Result<Listing<GameLogRecord>>;
}

/// Documents shared by the file and HTTP feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    FantasyTeams,
    NbaTeams,
    Players,
    Salaries,
    Rosters,
    Schedule,
    MatchUps,
    BoxScores(NaiveDate),
}

impl Document {
    /// Relative path of the document, e.g. `box_scores/2025-11-19.json`
    pub fn path(&self) -> String {
        match self {
            Document::FantasyTeams => "fantasy_teams.json".to_string(),
            Document::NbaTeams => "nba_teams.json".to_string(),
            Document::Players => "players.json".to_string(),
            Document::Salaries => "salaries.json".to_string(),
            Document::Rosters => "rosters.json".to_string(),
            Document::Schedule => "schedule.json".to_string(),
            Document::MatchUps => "match_ups.json".to_string(),
            Document::BoxScores(date) => format!("box_scores/{}.json", date.format("%Y-%m-%d")),
        }
    }

    /// Entity label for per-row decode errors
    pub fn entity(&self) -> &'static str {
        match self {
            Document::FantasyTeams => "fantasy team",
            Document::NbaTeams => "NBA team",
            Document::Players => "player",
            Document::Salaries => "salary",
            Document::Rosters => "roster",
            Document::Schedule => "schedule entry",
            Document::MatchUps => "match-up",
            Document::BoxScores(_) => "game log",
        }
    }
}

/// Pull the row array out of a listing document. Either a bare array or an
/// object holding the array under `rows`/`data` is accepted.
pub(crate) fn listing_rows(
    source_name: &str,
    document: Document,
    value: serde_json::Value,
) -> Result<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(rows) => Ok(rows),
        serde_json::Value::Object(mut map) => {
            for key in ["rows", "data"] {
                if let Some(serde_json::Value::Array(rows)) = map.remove(key) {
                    return Ok(rows);
                }
            }
            Err(crate::error::SyncError::upstream(
                source_name,
                format!("{} holds no row array", document.path()),
                false,
            ))
        }
        _ => Err(crate::error::SyncError::upstream(
            source_name,
            format!("{} is not a JSON array", document.path()),
            false,
        )),
    }
}
