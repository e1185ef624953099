//! Data models for the storage layer

use crate::cli::types::{FantasyTeamId, NbaTeamId, PlayerId, PlayerStatus, Position, Week};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// NBA franchise; static reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NbaTeam {
    pub team_id: NbaTeamId,
    pub team_name: String,
    pub team_code: String,
}

/// Fantasy team in the league. Only the display fields ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FantasyTeam {
    pub team_id: FantasyTeamId,
    pub team_name: String,
    pub manager: String,
}

/// Canonical player record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub nba_team_id: Option<NbaTeamId>,
    pub salary: Option<i64>,
    pub positions: BTreeSet<Position>,
    pub status: PlayerStatus,
    pub is_available: bool,
}

impl Player {
    /// A freshly inserted player: every optional field at its default.
    pub fn new(player_id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            player_id,
            name: name.into(),
            aliases: BTreeSet::new(),
            nba_team_id: None,
            salary: None,
            positions: BTreeSet::new(),
            status: PlayerStatus::default(),
            is_available: true,
        }
    }
}

/// A player's membership on a fantasy team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub team_id: FantasyTeamId,
}

/// One scheduled (or played) NBA game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub game_date: NaiveDate,
    pub home_team_id: NbaTeamId,
    pub away_team_id: NbaTeamId,
}

/// A fantasy team's scoring week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUp {
    pub team_id: FantasyTeamId,
    pub week: Week,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub is_playoffs: bool,
}

/// Per-game box score counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub field_goals: u32,
    #[serde(default)]
    pub field_goal_attempts: u32,
    #[serde(default)]
    pub free_throws: u32,
    #[serde(default)]
    pub free_throw_attempts: u32,
    #[serde(default)]
    pub three_pointers: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub rebounds: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub steals: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub turnovers: u32,
}

/// One player's line for one game date. Written once, never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub player_id: PlayerId,
    pub game_date: NaiveDate,
    pub stats: StatLine,
}

/// Row counts per table, for the `status` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub nba_teams: u64,
    pub fantasy_teams: u64,
    pub players: u64,
    pub aliases: u64,
    pub rosters: u64,
    pub schedule: u64,
    pub match_ups: u64,
    pub game_logs: u64,
    pub latest_game_date: Option<NaiveDate>,
}
