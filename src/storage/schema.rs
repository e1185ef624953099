//! Database schema and connection management

use crate::error::{Result, SyncError};
use dirs::cache_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection manager for league data
pub struct LeagueDatabase {
    pub(crate) conn: Connection,
}

impl LeagueDatabase {
    /// Open the database at `path` (creating parent directories) and ensure
    /// tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open the database at the default cache location
    pub fn new() -> Result<Self> {
        Self::open(&Self::default_path()?)
    }

    /// In-memory database, used by tests
    pub fn new_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Default path: `<cache dir>/hoops-sync/league.db`
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = cache_dir().ok_or_else(|| SyncError::Config {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("hoops-sync").join("league.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS nba_teams (
                nba_team_id INTEGER PRIMARY KEY,
                team_name TEXT NOT NULL UNIQUE,
                team_code TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS fantasy_teams (
                team_id INTEGER PRIMARY KEY,
                team_name TEXT NOT NULL,
                manager TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                player_id INTEGER PRIMARY KEY,
                player_name TEXT NOT NULL,
                nba_team_id INTEGER REFERENCES nba_teams(nba_team_id),
                salary INTEGER,
                positions TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                is_available INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS player_aliases (
                player_id INTEGER NOT NULL REFERENCES players(player_id),
                alias TEXT NOT NULL,
                PRIMARY KEY (player_id, alias)
            );

            CREATE TABLE IF NOT EXISTS rosters (
                player_id INTEGER NOT NULL UNIQUE REFERENCES players(player_id),
                team_id INTEGER NOT NULL REFERENCES fantasy_teams(team_id),
                PRIMARY KEY (player_id, team_id)
            );

            CREATE TABLE IF NOT EXISTS match_ups (
                team_id INTEGER NOT NULL REFERENCES fantasy_teams(team_id),
                week_no INTEGER NOT NULL,
                week_start TEXT NOT NULL,
                week_end TEXT NOT NULL,
                is_playoffs INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (team_id, week_no)
            );

            CREATE TABLE IF NOT EXISTS nba_schedule (
                game_date TEXT NOT NULL,
                home_team_id INTEGER NOT NULL REFERENCES nba_teams(nba_team_id),
                away_team_id INTEGER NOT NULL REFERENCES nba_teams(nba_team_id),
                PRIMARY KEY (game_date, home_team_id, away_team_id)
            );

            CREATE TABLE IF NOT EXISTS game_log (
                player_id INTEGER NOT NULL REFERENCES players(player_id),
                game_date TEXT NOT NULL,
                minutes INTEGER NOT NULL DEFAULT 0,
                field_goals INTEGER NOT NULL DEFAULT 0,
                field_goal_attempts INTEGER NOT NULL DEFAULT 0,
                free_throws INTEGER NOT NULL DEFAULT 0,
                free_throw_attempts INTEGER NOT NULL DEFAULT 0,
                three_pointers INTEGER NOT NULL DEFAULT 0,
                points INTEGER NOT NULL DEFAULT 0,
                rebounds INTEGER NOT NULL DEFAULT 0,
                assists INTEGER NOT NULL DEFAULT 0,
                steals INTEGER NOT NULL DEFAULT 0,
                blocks INTEGER NOT NULL DEFAULT 0,
                turnovers INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (player_id, game_date)
            );

            CREATE INDEX IF NOT EXISTS idx_game_log_date ON game_log(game_date);
            CREATE INDEX IF NOT EXISTS idx_schedule_date ON nba_schedule(game_date);
            CREATE INDEX IF NOT EXISTS idx_aliases_alias ON player_aliases(alias);",
        )?;

        Ok(())
    }

    /// Run `f` inside a single transaction: committed when `f` returns `Ok`,
    /// rolled back otherwise.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Clear the season-scoped league tables (rosters, match-ups, fantasy
    /// teams) ahead of a new season. Players, NBA teams, the schedule and
    /// game logs are kept.
    pub fn season_reset(&self) -> Result<()> {
        self.in_transaction(|db| {
            for table in ["rosters", "match_ups", "fantasy_teams"] {
                tracing::info!("Cleaning {}", table);
                db.conn.execute(&format!("DELETE FROM {}", table), [])?;
            }
            Ok(())
        })
    }
}
