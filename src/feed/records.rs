//! Fixed-field records handed from the feed boundary to the reconciler.
//!
//! Everything upstream-shaped stops at [`super::raw`]; the engine only ever
//! sees these types.

use crate::cli::types::{FantasyTeamId, NbaTeamId, PlayerId, PlayerStatus, Position, Week};
use crate::storage::StatLine;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FantasyTeamRecord {
    pub team_id: FantasyTeamId,
    pub team_name: String,
    pub manager: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NbaTeamRecord {
    pub team_id: NbaTeamId,
    pub team_name: String,
    pub team_code: String,
}

/// One entry of the player listing. `None` fields were absent upstream and
/// leave the stored value alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub source_id: Option<PlayerId>,
    pub name: String,
    pub nba_team: Option<NbaTeamId>,
    pub positions: Option<BTreeSet<Position>>,
    pub status: Option<PlayerStatus>,
}

impl PlayerRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            source_id: None,
            name: name.into(),
            nba_team: None,
            positions: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRecord {
    pub player_name: String,
    pub salary: i64,
}

/// How a roster row identifies its player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRef {
    Id(PlayerId),
    Name(String),
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRef::Id(id) => write!(f, "#{}", id),
            PlayerRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub team_id: FantasyTeamId,
    pub player: PlayerRef,
}

/// A scheduled game; teams are referenced by full name or 3-letter code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecord {
    pub game_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchUpRecord {
    pub team_id: FantasyTeamId,
    pub week: Week,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub is_playoffs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogRecord {
    pub player_name: String,
    pub team: Option<String>,
    pub game_date: NaiveDate,
    pub stats: StatLine,
}
