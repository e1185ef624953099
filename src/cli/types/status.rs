//! Player availability status and reconciliation phases.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player status as tracked in the `players` table.
///
/// Feeds report the injury designations; `Inactive` is only ever set by the
/// reconciler when a previously listed player disappears from every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlayerStatus {
    #[default]
    Active,
    DayToDay,
    GameTimeDecision,
    Out,
    Injured,
    Suspended,
    NotActive,
    Inactive,
}

impl PlayerStatus {
    /// Storage/feed code for this status.
    pub fn code(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "ACTIVE",
            PlayerStatus::DayToDay => "DTD",
            PlayerStatus::GameTimeDecision => "GTD",
            PlayerStatus::Out => "O",
            PlayerStatus::Injured => "INJ",
            PlayerStatus::Suspended => "SUSP",
            PlayerStatus::NotActive => "NA",
            PlayerStatus::Inactive => "INACTIVE",
        }
    }

    /// Map an optional upstream code to a status. A missing or empty code
    /// means the player is healthy.
    pub fn from_feed_code(code: Option<&str>) -> Result<Self, SyncError> {
        match code.map(str::trim) {
            None | Some("") => Ok(PlayerStatus::Active),
            Some(c) => c.parse(),
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PlayerStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(PlayerStatus::Active),
            "DTD" => Ok(PlayerStatus::DayToDay),
            "GTD" => Ok(PlayerStatus::GameTimeDecision),
            "O" | "OUT" => Ok(PlayerStatus::Out),
            "INJ" | "IL" | "IL+" => Ok(PlayerStatus::Injured),
            "SUSP" => Ok(PlayerStatus::Suspended),
            "NA" => Ok(PlayerStatus::NotActive),
            "INACTIVE" => Ok(PlayerStatus::Inactive),
            _ => Err(SyncError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PlayerStatus {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerStatus> for String {
    fn from(value: PlayerStatus) -> Self {
        value.code().to_string()
    }
}

/// One entity type's reconciliation step, in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FantasyTeams,
    NbaTeams,
    Players,
    Rosters,
    Schedule,
    MatchUps,
    GameLogs,
}

impl Phase {
    /// Fixed dependency order of a full pass.
    pub const ORDER: [Phase; 7] = [
        Phase::FantasyTeams,
        Phase::NbaTeams,
        Phase::Players,
        Phase::Rosters,
        Phase::Schedule,
        Phase::MatchUps,
        Phase::GameLogs,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::FantasyTeams => "fantasy teams",
            Phase::NbaTeams => "NBA teams",
            Phase::Players => "players",
            Phase::Rosters => "rosters",
            Phase::Schedule => "schedule",
            Phase::MatchUps => "match-ups",
            Phase::GameLogs => "game logs",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_codes() {
        assert_eq!(PlayerStatus::from_feed_code(None).unwrap(), PlayerStatus::Active);
        assert_eq!(PlayerStatus::from_feed_code(Some("")).unwrap(), PlayerStatus::Active);
        assert_eq!(PlayerStatus::from_feed_code(Some("O")).unwrap(), PlayerStatus::Out);
        assert_eq!(
            PlayerStatus::from_feed_code(Some("gtd")).unwrap(),
            PlayerStatus::GameTimeDecision
        );
        assert!(PlayerStatus::from_feed_code(Some("HURT")).is_err());
    }

    #[test]
    fn test_status_code_round_trip() {
        for status in [
            PlayerStatus::Active,
            PlayerStatus::DayToDay,
            PlayerStatus::Out,
            PlayerStatus::Inactive,
        ] {
            assert_eq!(status.code().parse::<PlayerStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_phase_order_is_sorted() {
        let mut sorted = Phase::ORDER;
        sorted.sort();
        assert_eq!(sorted, Phase::ORDER);
        assert_eq!(Phase::ORDER.first(), Some(&Phase::FantasyTeams));
        assert_eq!(Phase::ORDER.last(), Some(&Phase::GameLogs));
    }
}
