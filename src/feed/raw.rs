//! Upstream JSON shapes and their normalization into engine records.
//!
//! Sources drift: ids arrive as numbers or strings, the same field has two
//! or three names, optional fields go missing. These structs absorb that and
//! `TryFrom` turns each one into a fixed-field record or an
//! `InvalidRecord` error for that row alone.

use super::records::*;
use crate::cli::types::{
    parse_game_date, FantasyTeamId, NbaTeamId, PlayerId, PlayerStatus, Position, Week,
};
use crate::error::{Result, SyncError};
use crate::storage::StatLine;
use chrono::NaiveDate;
use serde::{de::Error, Deserialize, Deserializer};
use std::collections::BTreeSet;

/// Number or numeric string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(u64),
    Text(String),
}

impl IdValue {
    fn parse(&self, entity: &'static str) -> Result<u64> {
        match self {
            IdValue::Num(n) => Ok(*n),
            IdValue::Text(s) => s.trim().parse::<u64>().map_err(|_| SyncError::InvalidRecord {
                entity,
                reason: format!("id '{}' is not a number", s),
            }),
        }
    }

    /// Player ids are stored as signed 64-bit integers.
    fn parse_player_id(&self, entity: &'static str) -> Result<PlayerId> {
        let id = self.parse(entity)?;
        i64::try_from(id)
            .map(|_| PlayerId::new(id))
            .map_err(|_| SyncError::InvalidRecord {
                entity,
                reason: format!("player id {} is out of range", id),
            })
    }

    fn parse_u32(&self, entity: &'static str) -> Result<u32> {
        let id = self.parse(entity)?;
        u32::try_from(id).map_err(|_| SyncError::InvalidRecord {
            entity,
            reason: format!("id {} is out of range", id),
        })
    }
}

/// Salary as a number or a display string such as `"$12,345,678"`
fn de_salary<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => parse_salary(&s).map_err(D::Error::custom),
    }
}

pub(crate) fn parse_salary(s: &str) -> std::result::Result<i64, String> {
    let digits: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    digits
        .parse::<i64>()
        .map_err(|_| format!("salary '{}' is not a dollar amount", s))
}

/// Counting stat as a number, a numeric string, or blank (zero)
fn de_stat<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Float(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Float(f) if f >= 0.0 => Ok(f.round() as u32),
        Raw::Float(f) => Err(D::Error::custom(format!("negative stat {}", f))),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("stat '{}' is not a count", s))),
        Raw::Null(()) => Ok(0),
    }
}

fn required(entity: &'static str, field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(SyncError::InvalidRecord {
            entity,
            reason: format!("{} is empty", field),
        });
    }
    Ok(value)
}

fn record_date(entity: &'static str, value: &str) -> Result<NaiveDate> {
    parse_game_date(value).map_err(|e| SyncError::InvalidRecord {
        entity,
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFantasyTeam {
    #[serde(alias = "id")]
    pub team_id: IdValue,
    #[serde(alias = "name")]
    pub team_name: String,
    #[serde(default, alias = "owner")]
    pub manager: Option<String>,
}

impl TryFrom<RawFantasyTeam> for FantasyTeamRecord {
    type Error = SyncError;

    fn try_from(raw: RawFantasyTeam) -> Result<Self> {
        const ENTITY: &str = "fantasy team";
        Ok(FantasyTeamRecord {
            team_id: FantasyTeamId::new(raw.team_id.parse_u32(ENTITY)?),
            team_name: required(ENTITY, "team name", raw.team_name)?,
            manager: raw.manager.map(|m| m.trim().to_string()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNbaTeam {
    #[serde(alias = "id")]
    pub team_id: IdValue,
    #[serde(alias = "name")]
    pub team_name: String,
    #[serde(alias = "code", alias = "abbreviation")]
    pub team_code: String,
}

impl TryFrom<RawNbaTeam> for NbaTeamRecord {
    type Error = SyncError;

    fn try_from(raw: RawNbaTeam) -> Result<Self> {
        const ENTITY: &str = "NBA team";
        let code = raw.team_code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SyncError::InvalidRecord {
                entity: ENTITY,
                reason: format!("team code '{}' is not three letters", raw.team_code),
            });
        }
        Ok(NbaTeamRecord {
            team_id: NbaTeamId::new(raw.team_id.parse_u32(ENTITY)?),
            team_name: required(ENTITY, "team name", raw.team_name)?,
            team_code: code,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    #[serde(default, alias = "id", alias = "player_id")]
    pub source_id: Option<IdValue>,
    #[serde(alias = "player_name", alias = "full_name")]
    pub name: String,
    #[serde(default, alias = "team_id")]
    pub nba_team_id: Option<IdValue>,
    #[serde(default, alias = "eligible_positions")]
    pub positions: Option<Vec<String>>,
    #[serde(default, alias = "injury_status")]
    pub status: Option<String>,
}

impl TryFrom<RawPlayer> for PlayerRecord {
    type Error = SyncError;

    fn try_from(raw: RawPlayer) -> Result<Self> {
        const ENTITY: &str = "player";
        let positions = match raw.positions {
            Some(list) => Some(
                list.iter()
                    .map(|p| p.parse::<Position>())
                    .collect::<Result<BTreeSet<_>>>()?,
            ),
            None => None,
        };
        let status = match raw.status.as_deref() {
            Some(code) => Some(PlayerStatus::from_feed_code(Some(code))?),
            None => None,
        };

        Ok(PlayerRecord {
            source_id: raw
                .source_id
                .map(|id| id.parse_player_id(ENTITY))
                .transpose()?,
            name: required(ENTITY, "player name", raw.name)?,
            nba_team: raw
                .nba_team_id
                .map(|id| id.parse_u32(ENTITY).map(NbaTeamId::new))
                .transpose()?,
            positions,
            status,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSalary {
    #[serde(alias = "name", alias = "player")]
    pub player_name: String,
    #[serde(deserialize_with = "de_salary")]
    pub salary: i64,
}

impl TryFrom<RawSalary> for SalaryRecord {
    type Error = SyncError;

    fn try_from(raw: RawSalary) -> Result<Self> {
        const ENTITY: &str = "salary";
        if raw.salary < 0 {
            return Err(SyncError::InvalidRecord {
                entity: ENTITY,
                reason: format!("negative salary {}", raw.salary),
            });
        }
        Ok(SalaryRecord {
            player_name: required(ENTITY, "player name", raw.player_name)?,
            salary: raw.salary,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoster {
    pub team_id: IdValue,
    #[serde(default)]
    pub player_id: Option<IdValue>,
    #[serde(default, alias = "name")]
    pub player_name: Option<String>,
}

impl TryFrom<RawRoster> for RosterRecord {
    type Error = SyncError;

    fn try_from(raw: RawRoster) -> Result<Self> {
        const ENTITY: &str = "roster";
        let player = match (raw.player_id, raw.player_name) {
            (Some(id), _) => PlayerRef::Id(id.parse_player_id(ENTITY)?),
            (None, Some(name)) => PlayerRef::Name(required(ENTITY, "player name", name)?),
            (None, None) => {
                return Err(SyncError::InvalidRecord {
                    entity: ENTITY,
                    reason: "neither player_id nor player_name given".to_string(),
                })
            }
        };
        Ok(RosterRecord {
            team_id: FantasyTeamId::new(raw.team_id.parse_u32(ENTITY)?),
            player,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSchedule {
    #[serde(alias = "date")]
    pub game_date: String,
    #[serde(alias = "home_team_name")]
    pub home_team: String,
    #[serde(alias = "visiting_team", alias = "away_team_name")]
    pub away_team: String,
}

impl TryFrom<RawSchedule> for ScheduleRecord {
    type Error = SyncError;

    fn try_from(raw: RawSchedule) -> Result<Self> {
        const ENTITY: &str = "schedule entry";
        Ok(ScheduleRecord {
            game_date: record_date(ENTITY, &raw.game_date)?,
            home_team: required(ENTITY, "home team", raw.home_team)?,
            away_team: required(ENTITY, "away team", raw.away_team)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchUp {
    pub team_id: IdValue,
    #[serde(alias = "week")]
    pub week_no: u16,
    pub week_start: String,
    pub week_end: String,
    #[serde(default)]
    pub is_playoffs: bool,
}

impl TryFrom<RawMatchUp> for MatchUpRecord {
    type Error = SyncError;

    fn try_from(raw: RawMatchUp) -> Result<Self> {
        const ENTITY: &str = "match-up";
        let week_start = record_date(ENTITY, &raw.week_start)?;
        let week_end = record_date(ENTITY, &raw.week_end)?;
        if week_end < week_start {
            return Err(SyncError::InvalidRecord {
                entity: ENTITY,
                reason: format!("week ends ({}) before it starts ({})", week_end, week_start),
            });
        }
        Ok(MatchUpRecord {
            team_id: FantasyTeamId::new(raw.team_id.parse_u32(ENTITY)?),
            week: Week::new(raw.week_no),
            week_start,
            week_end,
            is_playoffs: raw.is_playoffs,
        })
    }
}

/// Box score counters under either long or box-score column names
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatLine {
    #[serde(default, alias = "mp", deserialize_with = "de_stat")]
    pub minutes: u32,
    #[serde(default, alias = "fg", deserialize_with = "de_stat")]
    pub field_goals: u32,
    #[serde(default, alias = "fga", deserialize_with = "de_stat")]
    pub field_goal_attempts: u32,
    #[serde(default, alias = "ft", deserialize_with = "de_stat")]
    pub free_throws: u32,
    #[serde(default, alias = "fta", deserialize_with = "de_stat")]
    pub free_throw_attempts: u32,
    #[serde(default, alias = "fg3", alias = "3p", deserialize_with = "de_stat")]
    pub three_pointers: u32,
    #[serde(default, alias = "pts", deserialize_with = "de_stat")]
    pub points: u32,
    #[serde(default, alias = "trb", deserialize_with = "de_stat")]
    pub rebounds: u32,
    #[serde(default, alias = "ast", deserialize_with = "de_stat")]
    pub assists: u32,
    #[serde(default, alias = "stl", deserialize_with = "de_stat")]
    pub steals: u32,
    #[serde(default, alias = "blk", deserialize_with = "de_stat")]
    pub blocks: u32,
    #[serde(default, alias = "tov", deserialize_with = "de_stat")]
    pub turnovers: u32,
}

impl From<RawStatLine> for StatLine {
    fn from(raw: RawStatLine) -> Self {
        StatLine {
            minutes: raw.minutes,
            field_goals: raw.field_goals,
            field_goal_attempts: raw.field_goal_attempts,
            free_throws: raw.free_throws,
            free_throw_attempts: raw.free_throw_attempts,
            three_pointers: raw.three_pointers,
            points: raw.points,
            rebounds: raw.rebounds,
            assists: raw.assists,
            steals: raw.steals,
            blocks: raw.blocks,
            turnovers: raw.turnovers,
        }
    }
}

/// One row of a daily box-score listing. The date comes from the listing
/// itself, so rows are normalized with [`RawBoxScore::into_record`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawBoxScore {
    #[serde(alias = "name", alias = "player")]
    pub player_name: String,
    #[serde(default, alias = "team_code", alias = "tm")]
    pub team: Option<String>,
    #[serde(flatten)]
    pub stats: RawStatLine,
}

impl RawBoxScore {
    pub fn into_record(self, game_date: NaiveDate) -> Result<GameLogRecord> {
        Ok(GameLogRecord {
            player_name: required("game log", "player name", self.player_name)?,
            team: self
                .team
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            game_date,
            stats: self.stats.into(),
        })
    }
}

/// Deserialize a listing row by row. A row that fails to decode becomes an
/// `InvalidRecord` in place; the listing as a whole must still be an array.
pub fn decode_rows<R, T>(entity: &'static str, rows: Vec<serde_json::Value>) -> Vec<Result<T>>
where
    R: for<'de> Deserialize<'de>,
    T: TryFrom<R, Error = SyncError>,
{
    rows.into_iter()
        .map(|row| {
            let raw: R = serde_json::from_value(row).map_err(|e| SyncError::InvalidRecord {
                entity,
                reason: e.to_string(),
            })?;
            T::try_from(raw)
        })
        .collect()
}

/// Same as [`decode_rows`] for box scores, stamping each row with `date`.
pub fn decode_box_scores(
    rows: Vec<serde_json::Value>,
    date: NaiveDate,
) -> Vec<Result<GameLogRecord>> {
    rows.into_iter()
        .map(|row| {
            let raw: RawBoxScore =
                serde_json::from_value(row).map_err(|e| SyncError::InvalidRecord {
                    entity: "game log",
                    reason: e.to_string(),
                })?;
            raw.into_record(date)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_ids_beyond_the_store_are_invalid() {
        let raw: RawPlayer = serde_json::from_value(
            json!({"id": 18446744073709551615u64, "name": "Huge Id"}),
        )
        .unwrap();
        assert!(matches!(
            PlayerRecord::try_from(raw),
            Err(SyncError::InvalidRecord { entity: "player", .. })
        ));

        let raw: RawRoster =
            serde_json::from_value(json!({"team_id": 1, "player_id": "9223372036854775808"}))
                .unwrap();
        assert!(matches!(
            RosterRecord::try_from(raw),
            Err(SyncError::InvalidRecord { entity: "roster", .. })
        ));

        let raw: RawPlayer =
            serde_json::from_value(json!({"id": "9223372036854775807", "name": "Edge"})).unwrap();
        let record = PlayerRecord::try_from(raw).unwrap();
        assert_eq!(record.source_id, Some(PlayerId::new(i64::MAX as u64)));
    }

    #[test]
    fn test_ids_as_number_or_string() {
        let a: RawFantasyTeam =
            serde_json::from_value(json!({"id": 4, "name": "Bench Mob"})).unwrap();
        let b: RawFantasyTeam = serde_json::from_value(
            json!({"team_id": "4", "team_name": "Bench Mob", "manager": "K"}),
        )
        .unwrap();
        let a = FantasyTeamRecord::try_from(a).unwrap();
        let b = FantasyTeamRecord::try_from(b).unwrap();
        assert_eq!(a.team_id, b.team_id);
        assert_eq!(a.manager, "");
        assert_eq!(b.manager, "K");
    }

    #[test]
    fn test_nba_team_code_is_uppercased_and_checked() {
        let raw: RawNbaTeam =
            serde_json::from_value(json!({"id": 1, "name": "Chicago Bulls", "code": "chi"}))
                .unwrap();
        assert_eq!(NbaTeamRecord::try_from(raw).unwrap().team_code, "CHI");

        let raw: RawNbaTeam =
            serde_json::from_value(json!({"id": 1, "name": "Chicago Bulls", "code": "BULLS"}))
                .unwrap();
        assert!(matches!(
            NbaTeamRecord::try_from(raw),
            Err(SyncError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_player_optional_fields() {
        let raw: RawPlayer = serde_json::from_value(json!({
            "player_name": "Nikola Jokić",
            "team_id": "7",
            "positions": ["C", "pf"],
            "injury_status": "DTD"
        }))
        .unwrap();
        let record = PlayerRecord::try_from(raw).unwrap();
        assert_eq!(record.source_id, None);
        assert_eq!(record.nba_team, Some(NbaTeamId::new(7)));
        assert_eq!(
            record.positions,
            Some([Position::C, Position::PF].into_iter().collect())
        );
        assert_eq!(record.status, Some(PlayerStatus::DayToDay));

        let bare: RawPlayer = serde_json::from_value(json!({"name": "Joe Smith"})).unwrap();
        assert_eq!(PlayerRecord::try_from(bare).unwrap(), PlayerRecord::named("Joe Smith"));
    }

    #[test]
    fn test_player_bad_position_is_record_error() {
        let raw: RawPlayer =
            serde_json::from_value(json!({"name": "Joe Smith", "positions": ["QB"]})).unwrap();
        let err = PlayerRecord::try_from(raw).unwrap_err();
        assert!(err.is_record_level());
    }

    #[test]
    fn test_salary_strings() {
        assert_eq!(parse_salary("$12,345,678"), Ok(12_345_678));
        assert_eq!(parse_salary(" 950000 "), Ok(950_000));
        assert!(parse_salary("TBD").is_err());

        let raw: RawSalary =
            serde_json::from_value(json!({"player": "Zach LaVine", "salary": "$40,064,220"}))
                .unwrap();
        assert_eq!(SalaryRecord::try_from(raw).unwrap().salary, 40_064_220);
    }

    #[test]
    fn test_roster_player_reference() {
        let by_id: RawRoster =
            serde_json::from_value(json!({"team_id": 1, "player_id": "23"})).unwrap();
        assert_eq!(
            RosterRecord::try_from(by_id).unwrap().player,
            PlayerRef::Id(PlayerId::new(23))
        );

        let by_name: RawRoster =
            serde_json::from_value(json!({"team_id": 1, "name": "Zach LaVine"})).unwrap();
        assert_eq!(
            RosterRecord::try_from(by_name).unwrap().player,
            PlayerRef::Name("Zach LaVine".to_string())
        );

        let neither: RawRoster = serde_json::from_value(json!({"team_id": 1})).unwrap();
        assert!(RosterRecord::try_from(neither).is_err());
    }

    #[test]
    fn test_schedule_field_aliases() {
        let raw: RawSchedule = serde_json::from_value(json!({
            "date": "2025-10-21",
            "home_team_name": "Los Angeles Lakers",
            "visiting_team": "GSW"
        }))
        .unwrap();
        let record = ScheduleRecord::try_from(raw).unwrap();
        assert_eq!(record.game_date, NaiveDate::from_ymd_opt(2025, 10, 21).unwrap());
        assert_eq!(record.away_team, "GSW");
    }

    #[test]
    fn test_match_up_week_order() {
        let raw: RawMatchUp = serde_json::from_value(json!({
            "team_id": 2, "week": 3, "week_start": "2025-11-09", "week_end": "2025-11-03"
        }))
        .unwrap();
        assert!(matches!(
            MatchUpRecord::try_from(raw),
            Err(SyncError::InvalidRecord { entity: "match-up", .. })
        ));
    }

    #[test]
    fn test_box_score_short_columns_and_blanks() {
        let raw: RawBoxScore = serde_json::from_value(json!({
            "player": "Zach LaVine",
            "tm": "CHI",
            "mp": "36",
            "fg": 12,
            "fga": 22,
            "ft": "",
            "fg3": 3,
            "pts": 27,
            "trb": 5,
            "tov": null
        }))
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
        let record = raw.into_record(date).unwrap();
        assert_eq!(record.team.as_deref(), Some("CHI"));
        assert_eq!(record.stats.minutes, 36);
        assert_eq!(record.stats.free_throws, 0);
        assert_eq!(record.stats.three_pointers, 3);
        assert_eq!(record.stats.turnovers, 0);
        assert_eq!(record.game_date, date);
    }

    #[test]
    fn test_decode_rows_isolates_bad_rows() {
        let rows = vec![
            json!({"id": 1, "name": "A Team"}),
            json!({"name": "No Id"}),
            json!({"id": "x", "name": "Bad Id"}),
        ];
        let decoded: Vec<Result<FantasyTeamRecord>> =
            decode_rows::<RawFantasyTeam, _>("fantasy team", rows);
        assert!(decoded[0].is_ok());
        assert!(matches!(decoded[1], Err(SyncError::InvalidRecord { .. })));
        assert!(matches!(decoded[2], Err(SyncError::InvalidRecord { .. })));
    }
}
