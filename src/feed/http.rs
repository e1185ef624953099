//! HTTP feed: the same listing documents served under a base URL.

use super::raw::{self, *};
use super::records::*;
use super::{listing_rows, Document, LeagueFeed, Listing};
use crate::cli::types::{LeagueId, Season};
use crate::core::http::feed_header_map;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header::HeaderMap, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

#[cfg(test)]
mod tests;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches listings with `GET {base_url}/{document}`.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    headers: HeaderMap,
    base_url: String,
    league_id: Option<LeagueId>,
}

impl HttpFeed {
    /// Feed with headers from the environment (see [`feed_header_map`]).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_headers(base_url, timeout, feed_header_map()?)
    }

    pub fn with_headers(
        base_url: impl Into<String>,
        timeout: Duration,
        headers: HeaderMap,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            headers,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            league_id: None,
        })
    }

    /// Scope league listings with a `league_id` query parameter.
    pub fn with_league_id(mut self, league_id: LeagueId) -> Self {
        self.league_id = Some(league_id);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, document: Document, err: reqwest::Error) -> SyncError {
        let transient = err.is_timeout()
            || err.is_connect()
            || err.status().is_some_and(|s| s.is_server_error());
        SyncError::upstream(
            &self.base_url,
            format!("GET {}: {}", document.path(), err),
            transient,
        )
    }

    /// GET a document. `Ok(None)` on 404.
    async fn fetch(
        &self,
        document: Document,
        season: Option<Season>,
    ) -> Result<Option<Vec<Value>>> {
        let url = format!("{}/{}", self.base_url, document.path());
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(league_id) = self.league_id {
            params.push(("league_id", league_id.to_string()));
        }
        if let Some(season) = season {
            params.push(("season", season.to_string()));
        }
        let request = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .query(&params);

        tracing::debug!(%url, "Fetching listing");
        let res = request
            .send()
            .await
            .map_err(|e| self.classify(document, e))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = res
            .error_for_status()
            .map_err(|e| self.classify(document, e))?;
        let value = res.json::<Value>().await.map_err(|e| {
            SyncError::upstream(
                &self.base_url,
                format!("decoding {}: {}", document.path(), e),
                e.is_timeout(),
            )
        })?;

        listing_rows(&self.base_url, document, value).map(Some)
    }

    async fn required(&self, document: Document, season: Option<Season>) -> Result<Vec<Value>> {
        self.fetch(document, season).await?.ok_or_else(|| {
            SyncError::upstream(
                &self.base_url,
                format!("{} not found", document.path()),
                false,
            )
        })
    }

    async fn decode<R, T>(&self, document: Document, season: Option<Season>) -> Result<Listing<T>>
    where
        R: for<'de> serde::Deserialize<'de>,
        T: TryFrom<R, Error = SyncError>,
    {
        let rows = self.required(document, season).await?;
        Ok(raw::decode_rows::<R, T>(document.entity(), rows))
    }
}

#[async_trait]
impl LeagueFeed for HttpFeed {
    fn source_name(&self) -> &str {
        &self.base_url
    }

    async fn fantasy_teams(&self) -> Result<Listing<FantasyTeamRecord>> {
        self.decode::<RawFantasyTeam, _>(Document::FantasyTeams, None)
            .await
    }

    async fn nba_teams(&self) -> Result<Listing<NbaTeamRecord>> {
        self.decode::<RawNbaTeam, _>(Document::NbaTeams, None).await
    }

    async fn players(&self) -> Result<Listing<PlayerRecord>> {
        self.decode::<RawPlayer, _>(Document::Players, None).await
    }

    /// Salaries are optional; a 404 means none are published yet.
    async fn salaries(&self, season: Season) -> Result<Listing<SalaryRecord>> {
        match self.fetch(Document::Salaries, Some(season)).await? {
            Some(rows) => Ok(raw::decode_rows::<RawSalary, _>(
                Document::Salaries.entity(),
                rows,
            )),
            None => Ok(Vec::new()),
        }
    }

    async fn rosters(&self) -> Result<Listing<RosterRecord>> {
        self.decode::<RawRoster, _>(Document::Rosters, None).await
    }

    async fn schedule(&self, season: Season) -> Result<Listing<ScheduleRecord>> {
        self.decode::<RawSchedule, _>(Document::Schedule, Some(season))
            .await
    }

    async fn match_ups(&self) -> Result<Listing<MatchUpRecord>> {
        self.decode::<RawMatchUp, _>(Document::MatchUps, None).await
    }

    async fn box_scores(&self, date: NaiveDate) -> Result<Listing<GameLogRecord>> {
        match self.fetch(Document::BoxScores(date), None).await? {
            Some(rows) => Ok(raw::decode_box_scores(rows, date)),
            None => Ok(Vec::new()),
        }
    }
}
