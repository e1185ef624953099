//! ID types for league, player and team records.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for fantasy league IDs.
///
/// Ensures league IDs are handled consistently throughout the application
/// and provides type safety to prevent mixing up league IDs with other numeric values.
///
/// # Examples
///
/// ```rust
/// use hoops_sync::LeagueId;
///
/// let league_id = LeagueId::new(3890);
/// assert_eq!(league_id.as_u32(), 3890);
/// assert_eq!(league_id.to_string(), "3890");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueId(pub u32);

impl LeagueId {
    /// Create a new LeagueId from a u32 value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeagueId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Type-safe wrapper for Player IDs.
///
/// Player IDs are stable across seasons; the same person keeps the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Largest id an SQLite INTEGER column can hold
    pub const MAX: u64 = i64::MAX as u64;

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Whether the id fits in the store.
    pub fn is_storable(&self) -> bool {
        self.0 <= Self::MAX
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let id = Self(s.trim().parse()?);
        if !id.is_storable() {
            return Err(SyncError::InvalidRecord {
                entity: "player",
                reason: format!("player id {} is out of range", id),
            });
        }
        Ok(id)
    }
}

/// Type-safe wrapper for fantasy team IDs within a league
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FantasyTeamId(pub u32);

impl FantasyTeamId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FantasyTeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FantasyTeamId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Type-safe wrapper for NBA team IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NbaTeamId(pub u32);

impl NbaTeamId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NbaTeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NbaTeamId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_parse_with_whitespace() {
        assert_eq!(" 42 ".parse::<PlayerId>().unwrap(), PlayerId::new(42));
        assert_eq!("7".parse::<FantasyTeamId>().unwrap().as_u32(), 7);
        assert_eq!("3890".parse::<LeagueId>().unwrap().as_u32(), 3890);
    }

    #[test]
    fn test_ids_reject_garbage() {
        assert!("abc".parse::<NbaTeamId>().is_err());
        assert!("-1".parse::<PlayerId>().is_err());
    }

    #[test]
    fn test_player_id_must_fit_the_store() {
        assert!(PlayerId::new(PlayerId::MAX).is_storable());
        assert!(!PlayerId::new(u64::MAX).is_storable());
        assert!(matches!(
            "9223372036854775808".parse::<PlayerId>(),
            Err(SyncError::InvalidRecord { .. })
        ));
        assert_eq!(
            "9223372036854775807".parse::<PlayerId>().unwrap().as_u64(),
            i64::MAX as u64
        );
    }
}
