//! File-backed feed: one JSON document per listing under a directory.

use super::raw::{self, *};
use super::{listing_rows, Document, LeagueFeed, Listing};
use super::records::*;
use crate::cli::types::Season;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads listings from files such as `players.json` and
/// `box_scores/2025-11-19.json` below `root`.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    root: PathBuf,
    name: String,
}

impl SnapshotFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = format!("snapshot {}", root.display());
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a document's rows. `Ok(None)` when the file does not exist.
    fn read_rows(&self, document: Document) -> Result<Option<Vec<serde_json::Value>>> {
        let path = self.root.join(document.path());
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::upstream(
                    &self.name,
                    format!("reading {}: {}", path.display(), e),
                    false,
                ))
            }
        };
        tracing::debug!(path = %path.display(), "Read snapshot document");

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            SyncError::upstream(
                &self.name,
                format!("{} is not valid JSON: {}", path.display(), e),
                false,
            )
        })?;
        listing_rows(&self.name, document, value).map(Some)
    }

    /// Rows of a listing that must exist
    fn required_rows(&self, document: Document) -> Result<Vec<serde_json::Value>> {
        self.read_rows(document)?.ok_or_else(|| {
            SyncError::upstream(
                &self.name,
                format!(
                    "{} not found in {}",
                    document.path(),
                    self.root.display()
                ),
                false,
            )
        })
    }

    fn decode<R, T>(&self, document: Document) -> Result<Listing<T>>
    where
        R: for<'de> serde::Deserialize<'de>,
        T: TryFrom<R, Error = SyncError>,
    {
        let rows = self.required_rows(document)?;
        Ok(raw::decode_rows::<R, T>(document.entity(), rows))
    }
}

#[async_trait]
impl LeagueFeed for SnapshotFeed {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn fantasy_teams(&self) -> Result<Listing<FantasyTeamRecord>> {
        self.decode::<RawFantasyTeam, _>(Document::FantasyTeams)
    }

    async fn nba_teams(&self) -> Result<Listing<NbaTeamRecord>> {
        self.decode::<RawNbaTeam, _>(Document::NbaTeams)
    }

    async fn players(&self) -> Result<Listing<PlayerRecord>> {
        self.decode::<RawPlayer, _>(Document::Players)
    }

    async fn salaries(&self, _season: Season) -> Result<Listing<SalaryRecord>> {
        // A snapshot directory holds a single season
        match self.read_rows(Document::Salaries)? {
            Some(rows) => Ok(raw::decode_rows::<RawSalary, _>(
                Document::Salaries.entity(),
                rows,
            )),
            None => Ok(Vec::new()),
        }
    }

    async fn rosters(&self) -> Result<Listing<RosterRecord>> {
        self.decode::<RawRoster, _>(Document::Rosters)
    }

    async fn schedule(&self, _season: Season) -> Result<Listing<ScheduleRecord>> {
        self.decode::<RawSchedule, _>(Document::Schedule)
    }

    async fn match_ups(&self) -> Result<Listing<MatchUpRecord>> {
        self.decode::<RawMatchUp, _>(Document::MatchUps)
    }

    async fn box_scores(&self, date: NaiveDate) -> Result<Listing<GameLogRecord>> {
        match self.read_rows(Document::BoxScores(date))? {
            Some(rows) => Ok(raw::decode_box_scores(rows, date)),
            None => Ok(Vec::new()),
        }
    }
}
