//! In-memory feed for tests, with scripted fetch failures.

use super::records::*;
use super::{LeagueFeed, Listing};
use crate::cli::types::Season;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Which listing a call fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    FantasyTeams,
    NbaTeams,
    Players,
    Salaries,
    Rosters,
    Schedule,
    MatchUps,
    BoxScores,
}

#[derive(Debug, Default)]
struct State {
    fantasy_teams: Vec<FantasyTeamRecord>,
    nba_teams: Vec<NbaTeamRecord>,
    players: Vec<PlayerRecord>,
    salaries: Vec<SalaryRecord>,
    rosters: Vec<RosterRecord>,
    schedule: Vec<ScheduleRecord>,
    match_ups: Vec<MatchUpRecord>,
    box_scores: BTreeMap<NaiveDate, Vec<GameLogRecord>>,
    invalid_rows: BTreeMap<Endpoint, Vec<String>>,
    failures: BTreeMap<Endpoint, VecDeque<bool>>,
    calls: BTreeMap<Endpoint, u32>,
    box_score_dates: Vec<NaiveDate>,
}

/// Feed whose listings are set directly. All setters take `&self` so a
/// test can change upstream data between two runs over the same feed.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    state: Mutex<State>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_fantasy_teams(&self, rows: Vec<FantasyTeamRecord>) {
        self.state().fantasy_teams = rows;
    }

    pub fn set_nba_teams(&self, rows: Vec<NbaTeamRecord>) {
        self.state().nba_teams = rows;
    }

    pub fn set_players(&self, rows: Vec<PlayerRecord>) {
        self.state().players = rows;
    }

    pub fn set_salaries(&self, rows: Vec<SalaryRecord>) {
        self.state().salaries = rows;
    }

    pub fn set_rosters(&self, rows: Vec<RosterRecord>) {
        self.state().rosters = rows;
    }

    pub fn set_schedule(&self, rows: Vec<ScheduleRecord>) {
        self.state().schedule = rows;
    }

    pub fn set_match_ups(&self, rows: Vec<MatchUpRecord>) {
        self.state().match_ups = rows;
    }

    pub fn set_box_scores(&self, date: NaiveDate, rows: Vec<GameLogRecord>) {
        self.state().box_scores.insert(date, rows);
    }

    /// Append a row that fails normalization with `reason`.
    pub fn add_invalid_row(&self, endpoint: Endpoint, reason: impl Into<String>) {
        self.state()
            .invalid_rows
            .entry(endpoint)
            .or_default()
            .push(reason.into());
    }

    /// Make the next `times` fetches of `endpoint` fail.
    pub fn fail_times(&self, endpoint: Endpoint, times: usize, transient: bool) {
        let mut state = self.state();
        let queue = state.failures.entry(endpoint).or_default();
        queue.extend(std::iter::repeat(transient).take(times));
    }

    /// Number of fetch attempts made against `endpoint`, failed ones included
    pub fn calls(&self, endpoint: Endpoint) -> u32 {
        self.state().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Every date a box-score listing was requested for, in call order
    pub fn fetched_box_score_dates(&self) -> Vec<NaiveDate> {
        self.state().box_score_dates.clone()
    }

    fn listing<T: Clone>(
        &self,
        endpoint: Endpoint,
        rows: impl FnOnce(&State) -> Vec<T>,
    ) -> Result<Listing<T>> {
        let mut state = self.state();
        *state.calls.entry(endpoint).or_insert(0) += 1;

        if let Some(transient) = state.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            return Err(SyncError::upstream(
                "memory",
                format!("scripted failure for {:?}", endpoint),
                transient,
            ));
        }

        let mut listing: Listing<T> = rows(&state).into_iter().map(Ok).collect();
        if let Some(reasons) = state.invalid_rows.get(&endpoint) {
            listing.extend(reasons.iter().map(|reason| {
                Err(SyncError::InvalidRecord {
                    entity: "memory row",
                    reason: reason.clone(),
                })
            }));
        }
        Ok(listing)
    }
}

#[async_trait]
impl LeagueFeed for MemoryFeed {
    fn source_name(&self) -> &str {
        "memory"
    }

    async fn fantasy_teams(&self) -> Result<Listing<FantasyTeamRecord>> {
        self.listing(Endpoint::FantasyTeams, |s| s.fantasy_teams.clone())
    }

    async fn nba_teams(&self) -> Result<Listing<NbaTeamRecord>> {
        self.listing(Endpoint::NbaTeams, |s| s.nba_teams.clone())
    }

    async fn players(&self) -> Result<Listing<PlayerRecord>> {
        self.listing(Endpoint::Players, |s| s.players.clone())
    }

    async fn salaries(&self, _season: Season) -> Result<Listing<SalaryRecord>> {
        self.listing(Endpoint::Salaries, |s| s.salaries.clone())
    }

    async fn rosters(&self) -> Result<Listing<RosterRecord>> {
        self.listing(Endpoint::Rosters, |s| s.rosters.clone())
    }

    async fn schedule(&self, _season: Season) -> Result<Listing<ScheduleRecord>> {
        self.listing(Endpoint::Schedule, |s| s.schedule.clone())
    }

    async fn match_ups(&self) -> Result<Listing<MatchUpRecord>> {
        self.listing(Endpoint::MatchUps, |s| s.match_ups.clone())
    }

    async fn box_scores(&self, date: NaiveDate) -> Result<Listing<GameLogRecord>> {
        self.state().box_score_dates.push(date);
        self.listing(Endpoint::BoxScores, |s| {
            s.box_scores.get(&date).cloned().unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::FantasyTeamId;

    #[tokio::test]
    async fn test_scripted_failures_then_success() {
        let feed = MemoryFeed::new();
        feed.set_fantasy_teams(vec![FantasyTeamRecord {
            team_id: FantasyTeamId::new(1),
            team_name: "Jo Quinoa".to_string(),
            manager: "J".to_string(),
        }]);
        feed.fail_times(Endpoint::FantasyTeams, 2, true);

        assert!(feed.fantasy_teams().await.unwrap_err().is_transient());
        assert!(feed.fantasy_teams().await.is_err());
        assert_eq!(feed.fantasy_teams().await.unwrap().len(), 1);
        assert_eq!(feed.calls(Endpoint::FantasyTeams), 3);
    }

    #[tokio::test]
    async fn test_invalid_rows_are_appended() {
        let feed = MemoryFeed::new();
        feed.add_invalid_row(Endpoint::Players, "bad row");
        let rows = feed.players().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].as_ref().unwrap_err().is_record_level());
    }

    #[tokio::test]
    async fn test_box_score_dates_are_recorded() {
        let feed = MemoryFeed::new();
        let date = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
        assert!(feed.box_scores(date).await.unwrap().is_empty());
        assert_eq!(feed.fetched_box_score_dates(), vec![date]);
    }
}
