//! Type-safe wrappers and enums for league, player and schedule data.

pub mod ids;
pub mod position;
pub mod status;
pub mod time;

pub use ids::{FantasyTeamId, LeagueId, NbaTeamId, PlayerId};
pub use position::Position;
pub use status::{Phase, PlayerStatus};
pub use time::{parse_game_date, Season, Week};
