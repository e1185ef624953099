//! Basic database query operations

use super::{models::*, schema::LeagueDatabase};
use crate::cli::types::{FantasyTeamId, NbaTeamId, PlayerId, PlayerStatus, Position, Week};
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::{params, types::Type, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};

const PLAYER_COLUMNS: &str =
    "player_id, player_name, nba_team_id, salary, positions, status, is_available";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

impl LeagueDatabase {
    // --- NBA teams -------------------------------------------------------

    pub fn get_nba_team(&self, team_id: NbaTeamId) -> Result<Option<NbaTeam>> {
        let team = self
            .conn
            .query_row(
                "SELECT nba_team_id, team_name, team_code FROM nba_teams WHERE nba_team_id = ?",
                params![team_id.as_u32()],
                Self::row_to_nba_team,
            )
            .optional()?;
        Ok(team)
    }

    /// Look an NBA team up by full name or 3-letter code (case-insensitive).
    pub fn find_nba_team(&self, name_or_code: &str) -> Result<Option<NbaTeam>> {
        let needle = name_or_code.trim();
        let team = self
            .conn
            .query_row(
                "SELECT nba_team_id, team_name, team_code FROM nba_teams
                 WHERE team_name = ?1 COLLATE NOCASE OR team_code = ?1 COLLATE NOCASE",
                params![needle],
                Self::row_to_nba_team,
            )
            .optional()?;
        Ok(team)
    }

    pub fn insert_nba_team(&self, team: &NbaTeam) -> Result<()> {
        self.conn.execute(
            "INSERT INTO nba_teams (nba_team_id, team_name, team_code) VALUES (?, ?, ?)",
            params![team.team_id.as_u32(), team.team_name, team.team_code],
        )?;
        Ok(())
    }

    pub fn update_nba_team(&self, team: &NbaTeam) -> Result<()> {
        self.conn.execute(
            "UPDATE nba_teams SET team_name = ?, team_code = ? WHERE nba_team_id = ?",
            params![team.team_name, team.team_code, team.team_id.as_u32()],
        )?;
        Ok(())
    }

    fn row_to_nba_team(row: &Row) -> rusqlite::Result<NbaTeam> {
        Ok(NbaTeam {
            team_id: NbaTeamId::new(row.get(0)?),
            team_name: row.get(1)?,
            team_code: row.get(2)?,
        })
    }

    // --- Fantasy teams ---------------------------------------------------

    pub fn get_fantasy_team(&self, team_id: FantasyTeamId) -> Result<Option<FantasyTeam>> {
        let team = self
            .conn
            .query_row(
                "SELECT team_id, team_name, manager FROM fantasy_teams WHERE team_id = ?",
                params![team_id.as_u32()],
                |row| {
                    Ok(FantasyTeam {
                        team_id: FantasyTeamId::new(row.get(0)?),
                        team_name: row.get(1)?,
                        manager: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(team)
    }

    pub fn insert_fantasy_team(&self, team: &FantasyTeam) -> Result<()> {
        self.conn.execute(
            "INSERT INTO fantasy_teams (team_id, team_name, manager) VALUES (?, ?, ?)",
            params![team.team_id.as_u32(), team.team_name, team.manager],
        )?;
        Ok(())
    }

    pub fn update_fantasy_team(&self, team: &FantasyTeam) -> Result<()> {
        self.conn.execute(
            "UPDATE fantasy_teams SET team_name = ?, manager = ? WHERE team_id = ?",
            params![team.team_name, team.manager, team.team_id.as_u32()],
        )?;
        Ok(())
    }

    // --- Players ---------------------------------------------------------

    /// Get a player with its alias set
    pub fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let player = self
            .conn
            .query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?"),
                params![player_id.as_u64()],
                Self::row_to_player,
            )
            .optional()?;

        match player {
            Some(mut player) => {
                player.aliases = self.get_aliases(player_id)?;
                Ok(Some(player))
            }
            None => Ok(None),
        }
    }

    /// All players, ordered by id, each with its alias set
    pub fn list_players(&self) -> Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY player_id"
        ))?;
        let rows = stmt.query_map([], Self::row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }

        let mut aliases = self.all_aliases()?;
        for player in &mut players {
            if let Some(set) = aliases.remove(&player.player_id) {
                player.aliases = set;
            }
        }
        Ok(players)
    }

    pub fn player_exists(&self, player_id: PlayerId) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM players WHERE player_id = ?",
                params![player_id.as_u64()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn player_count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Next free player id for players that arrive without a source id
    pub fn next_player_id(&self) -> Result<PlayerId> {
        let max: u64 = self.conn.query_row(
            "SELECT COALESCE(MAX(player_id), 0) FROM players",
            [],
            |row| row.get(0),
        )?;
        Ok(PlayerId::new(max + 1))
    }

    /// Insert a player row. Aliases on the model are written as well.
    pub fn insert_player(&self, player: &Player) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO players ({PLAYER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
            params![
                player.player_id.as_u64(),
                player.name,
                player.nba_team_id.map(|t| t.as_u32()),
                player.salary,
                serde_json::to_string(&player.positions)?,
                player.status.code(),
                player.is_available,
            ],
        )?;
        for alias in &player.aliases {
            self.add_alias(player.player_id, alias)?;
        }
        Ok(())
    }

    /// Overwrite the mutable player columns. The canonical name and aliases
    /// are not touched here.
    pub fn update_player(&self, player: &Player) -> Result<()> {
        self.conn.execute(
            "UPDATE players
             SET nba_team_id = ?, salary = ?, positions = ?, status = ?, is_available = ?
             WHERE player_id = ?",
            params![
                player.nba_team_id.map(|t| t.as_u32()),
                player.salary,
                serde_json::to_string(&player.positions)?,
                player.status.code(),
                player.is_available,
                player.player_id.as_u64(),
            ],
        )?;
        Ok(())
    }

    /// Record `alias` for a player. Returns false if it was already known.
    pub fn add_alias(&self, player_id: PlayerId, alias: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO player_aliases (player_id, alias) VALUES (?, ?)",
            params![player_id.as_u64(), alias],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_aliases(&self, player_id: PlayerId) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT alias FROM player_aliases WHERE player_id = ?")?;
        let rows = stmt.query_map(params![player_id.as_u64()], |row| row.get::<_, String>(0))?;

        let mut aliases = BTreeSet::new();
        for row in rows {
            aliases.insert(row?);
        }
        Ok(aliases)
    }

    /// Every alias, grouped by player
    pub fn all_aliases(&self) -> Result<BTreeMap<PlayerId, BTreeSet<String>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT player_id, alias FROM player_aliases")?;
        let rows = stmt.query_map([], |row| {
            Ok((PlayerId::new(row.get(0)?), row.get::<_, String>(1)?))
        })?;

        let mut aliases: BTreeMap<PlayerId, BTreeSet<String>> = BTreeMap::new();
        for row in rows {
            let (player_id, alias) = row?;
            aliases.entry(player_id).or_default().insert(alias);
        }
        Ok(aliases)
    }

    fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
        let positions_json: String = row.get(4)?;
        let positions: BTreeSet<Position> =
            serde_json::from_str(&positions_json).map_err(|e| conversion_error(4, e))?;
        let status_code: String = row.get(5)?;
        let status: PlayerStatus = status_code.parse().map_err(|e| conversion_error(5, e))?;

        Ok(Player {
            player_id: PlayerId::new(row.get(0)?),
            name: row.get(1)?,
            aliases: BTreeSet::new(),
            nba_team_id: row.get::<_, Option<u32>>(2)?.map(NbaTeamId::new),
            salary: row.get(3)?,
            positions,
            status,
            is_available: row.get(6)?,
        })
    }

    // --- Rosters ---------------------------------------------------------

    pub fn list_roster_entries(&self) -> Result<BTreeSet<RosterEntry>> {
        let mut stmt = self.conn.prepare("SELECT player_id, team_id FROM rosters")?;
        let rows = stmt.query_map([], |row| {
            Ok(RosterEntry {
                player_id: PlayerId::new(row.get(0)?),
                team_id: FantasyTeamId::new(row.get(1)?),
            })
        })?;

        let mut entries = BTreeSet::new();
        for row in rows {
            entries.insert(row?);
        }
        Ok(entries)
    }

    pub fn insert_roster_entry(&self, entry: &RosterEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO rosters (player_id, team_id) VALUES (?, ?)",
            params![entry.player_id.as_u64(), entry.team_id.as_u32()],
        )?;
        Ok(())
    }

    pub fn delete_roster_entry(&self, entry: &RosterEntry) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM rosters WHERE player_id = ? AND team_id = ?",
            params![entry.player_id.as_u64(), entry.team_id.as_u32()],
        )?;
        Ok(deleted > 0)
    }

    // --- Schedule --------------------------------------------------------

    pub fn schedule_entry_exists(&self, entry: &ScheduleEntry) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM nba_schedule
                 WHERE game_date = ? AND home_team_id = ? AND away_team_id = ?",
                params![
                    entry.game_date,
                    entry.home_team_id.as_u32(),
                    entry.away_team_id.as_u32()
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn insert_schedule_entry(&self, entry: &ScheduleEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO nba_schedule (game_date, home_team_id, away_team_id) VALUES (?, ?, ?)",
            params![
                entry.game_date,
                entry.home_team_id.as_u32(),
                entry.away_team_id.as_u32()
            ],
        )?;
        Ok(())
    }

    /// Distinct scheduled game dates in `[from, to]`, ascending. `from = None`
    /// means from the start of the schedule.
    pub fn schedule_dates_between(
        &self,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT game_date FROM nba_schedule
             WHERE (?1 IS NULL OR game_date >= ?1) AND game_date <= ?2
             ORDER BY game_date",
        )?;
        let rows = stmt.query_map(params![from, to], |row| row.get::<_, NaiveDate>(0))?;

        let mut dates = Vec::new();
        for row in rows {
            dates.push(row?);
        }
        Ok(dates)
    }

    // --- Match-ups -------------------------------------------------------

    pub fn get_match_up(&self, team_id: FantasyTeamId, week: Week) -> Result<Option<MatchUp>> {
        let match_up = self
            .conn
            .query_row(
                "SELECT team_id, week_no, week_start, week_end, is_playoffs FROM match_ups
                 WHERE team_id = ? AND week_no = ?",
                params![team_id.as_u32(), week.as_u16()],
                |row| {
                    Ok(MatchUp {
                        team_id: FantasyTeamId::new(row.get(0)?),
                        week: Week::new(row.get(1)?),
                        week_start: row.get(2)?,
                        week_end: row.get(3)?,
                        is_playoffs: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(match_up)
    }

    pub fn insert_match_up(&self, match_up: &MatchUp) -> Result<()> {
        self.conn.execute(
            "INSERT INTO match_ups (team_id, week_no, week_start, week_end, is_playoffs)
             VALUES (?, ?, ?, ?, ?)",
            params![
                match_up.team_id.as_u32(),
                match_up.week.as_u16(),
                match_up.week_start,
                match_up.week_end,
                match_up.is_playoffs
            ],
        )?;
        Ok(())
    }

    // --- Game logs -------------------------------------------------------

    pub fn get_game_log(
        &self,
        player_id: PlayerId,
        game_date: NaiveDate,
    ) -> Result<Option<GameLogEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT player_id, game_date, minutes, field_goals, field_goal_attempts,
                        free_throws, free_throw_attempts, three_pointers, points, rebounds,
                        assists, steals, blocks, turnovers
                 FROM game_log WHERE player_id = ? AND game_date = ?",
                params![player_id.as_u64(), game_date],
                |row| {
                    Ok(GameLogEntry {
                        player_id: PlayerId::new(row.get(0)?),
                        game_date: row.get(1)?,
                        stats: StatLine {
                            minutes: row.get(2)?,
                            field_goals: row.get(3)?,
                            field_goal_attempts: row.get(4)?,
                            free_throws: row.get(5)?,
                            free_throw_attempts: row.get(6)?,
                            three_pointers: row.get(7)?,
                            points: row.get(8)?,
                            rebounds: row.get(9)?,
                            assists: row.get(10)?,
                            steals: row.get(11)?,
                            blocks: row.get(12)?,
                            turnovers: row.get(13)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    pub fn insert_game_log(&self, entry: &GameLogEntry) -> Result<()> {
        let s = &entry.stats;
        self.conn.execute(
            "INSERT INTO game_log
             (player_id, game_date, minutes, field_goals, field_goal_attempts, free_throws,
              free_throw_attempts, three_pointers, points, rebounds, assists, steals, blocks,
              turnovers)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.player_id.as_u64(),
                entry.game_date,
                s.minutes,
                s.field_goals,
                s.field_goal_attempts,
                s.free_throws,
                s.free_throw_attempts,
                s.three_pointers,
                s.points,
                s.rebounds,
                s.assists,
                s.steals,
                s.blocks,
                s.turnovers
            ],
        )?;
        Ok(())
    }

    /// Latest game date with any stored box score
    pub fn latest_game_date(&self) -> Result<Option<NaiveDate>> {
        let date: Option<NaiveDate> =
            self.conn
                .query_row("SELECT MAX(game_date) FROM game_log", [], |row| row.get(0))?;
        Ok(date)
    }

    // --- Summary ---------------------------------------------------------

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<u64> {
            let n: u64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
            Ok(n)
        };

        Ok(StoreCounts {
            nba_teams: count("nba_teams")?,
            fantasy_teams: count("fantasy_teams")?,
            players: count("players")?,
            aliases: count("player_aliases")?,
            rosters: count("rosters")?,
            schedule: count("nba_schedule")?,
            match_ups: count("match_ups")?,
            game_logs: count("game_log")?,
            latest_game_date: self.latest_game_date()?,
        })
    }
}
