//! Basketball position types.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Eligible fantasy basketball positions.
///
/// Players usually carry several of these at once (a wing might be
/// `SG, SF, G, F`), so a player's eligibility is stored as a set.
///
/// # Examples
///
/// ```rust
/// use hoops_sync::Position;
///
/// let pg: Position = "pg".parse().unwrap();
/// assert_eq!(pg, Position::PG);
/// assert_eq!(Position::UTIL.to_string(), "UTIL");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    PG,
    SG,
    G,
    SF,
    PF,
    F,
    C,
    UTIL,
}

impl Position {
    /// Whether this is a flexible slot rather than a listed position.
    pub fn is_flex(&self) -> bool {
        matches!(self, Position::G | Position::F | Position::UTIL)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::G => "G",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::F => "F",
            Position::C => "C",
            Position::UTIL => "UTIL",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Position {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PG" => Ok(Position::PG),
            "SG" => Ok(Position::SG),
            "G" => Ok(Position::G),
            "SF" => Ok(Position::SF),
            "PF" => Ok(Position::PF),
            "F" => Ok(Position::F),
            "C" => Ok(Position::C),
            "UTIL" | "UTL" => Ok(Position::UTIL),
            _ => Err(SyncError::InvalidPosition {
                position: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(value: Position) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_position_string_conversion() {
        for pos in [
            Position::PG,
            Position::SG,
            Position::G,
            Position::SF,
            Position::PF,
            Position::F,
            Position::C,
            Position::UTIL,
        ] {
            assert_eq!(pos.to_string().parse::<Position>().unwrap(), pos);
        }
    }

    #[test]
    fn test_position_parse_is_case_insensitive() {
        assert_eq!("sf".parse::<Position>().unwrap(), Position::SF);
        assert_eq!(" c ".parse::<Position>().unwrap(), Position::C);
        assert_eq!("Util".parse::<Position>().unwrap(), Position::UTIL);
    }

    #[test]
    fn test_invalid_position() {
        match "QB".parse::<Position>() {
            Err(SyncError::InvalidPosition { position }) => assert_eq!(position, "QB"),
            other => panic!("Expected InvalidPosition, got {:?}", other),
        }
    }

    #[test]
    fn test_position_set_serializes_as_strings() {
        let set: BTreeSet<Position> = [Position::SF, Position::PG, Position::F].into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["PG","SF","F"]"#);

        let back: BTreeSet<Position> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_flex_positions() {
        assert!(Position::G.is_flex());
        assert!(Position::UTIL.is_flex());
        assert!(!Position::C.is_flex());
    }
}
