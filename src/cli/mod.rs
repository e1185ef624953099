//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use types::{parse_game_date, Phase, PlayerId, Season};

use crate::commands::ConfigOverrides;

/// Flags accepted by every subcommand
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (default: `./hoops-sync.toml` when present).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (default: `<cache dir>/hoops-sync/league.db`).
    #[clap(long, global = true)]
    pub database: Option<PathBuf>,

    /// Read listings from a directory of JSON snapshots.
    #[clap(long, global = true, conflicts_with = "api_url")]
    pub snapshot_dir: Option<PathBuf>,

    /// Fetch listings from an HTTP feed (or set `HOOPS_SYNC_API_URL`).
    #[clap(long, global = true)]
    pub api_url: Option<String>,

    /// Debug logging.
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

/// Arguments shared by the two reconciliation commands
#[derive(Debug, Args)]
pub struct SeasonArgs {
    /// Season, as the year it ends in (2026 = 2025-26).
    #[clap(long, short)]
    pub season: Option<Season>,

    /// Fetch box scores through this date, YYYY-MM-DD (default: today).
    #[clap(long, value_parser = parse_game_date)]
    pub as_of: Option<NaiveDate>,

    /// Resume at this phase; earlier phases are not run.
    #[clap(long = "from", value_enum)]
    pub start_at: Option<Phase>,

    /// Print the run summary as JSON.
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum AliasCmd {
    /// Record an alternate name for a player.
    ///
    /// Use this to settle names the run summary reports as ambiguous. A name
    /// that already belongs to another player is refused.
    Add {
        #[clap(long)]
        player_id: PlayerId,

        /// The alternate name.
        alias: String,
    },

    /// List recorded aliases.
    List {
        #[clap(long)]
        player_id: Option<PlayerId>,

        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initial load of a season: every phase, starting from an empty player table.
    InitSeason {
        #[clap(flatten)]
        args: SeasonArgs,

        /// Clear rosters, match-ups and fantasy teams first.
        #[clap(long)]
        reset_league: bool,
    },

    /// Incremental pass against an already loaded season.
    UpdateSeason {
        #[clap(flatten)]
        args: SeasonArgs,
    },

    /// Manage player aliases.
    Alias {
        #[clap(subcommand)]
        cmd: AliasCmd,
    },

    /// Row counts per table and the latest stored game date.
    Status {
        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "hoops-sync",
    version,
    about = "Reconcile fantasy basketball league data into a local store"
)]
pub struct HoopsSync {
    #[clap(flatten)]
    pub global: GlobalArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

impl GlobalArgs {
    pub fn overrides(&self, season: Option<Season>) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config.clone(),
            database: self.database.clone(),
            snapshot_dir: self.snapshot_dir.clone(),
            api_url: self.api_url.clone(),
            season,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        HoopsSync::command().debug_assert();
    }

    #[test]
    fn test_parse_update_season() {
        let app = HoopsSync::parse_from([
            "hoops-sync",
            "update-season",
            "--as-of",
            "2026-01-15",
            "--from",
            "rosters",
            "--snapshot-dir",
            "/data/feed",
        ]);
        assert_eq!(app.global.snapshot_dir, Some(PathBuf::from("/data/feed")));
        match app.command {
            Commands::UpdateSeason { args } => {
                assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2026, 1, 15));
                assert_eq!(args.start_at, Some(Phase::Rosters));
                assert!(!args.json);
            }
            other => panic!("Expected UpdateSeason, got {:?}", other),
        }
    }

    #[test]
    fn test_feed_flags_conflict() {
        let result = HoopsSync::try_parse_from([
            "hoops-sync",
            "status",
            "--snapshot-dir",
            "a",
            "--api-url",
            "http://b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_alias_add() {
        let app =
            HoopsSync::parse_from(["hoops-sync", "alias", "add", "--player-id", "42", "Mo Bamba"]);
        match app.command {
            Commands::Alias {
                cmd: AliasCmd::Add { player_id, alias },
            } => {
                assert_eq!(player_id, PlayerId::new(42));
                assert_eq!(alias, "Mo Bamba");
            }
            other => panic!("Expected alias add, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let result = HoopsSync::try_parse_from(["hoops-sync", "init-season", "--as-of", "01/15"]);
        assert!(result.is_err());
    }
}
