//! `status`: what the store currently holds.

use super::common::{load_settings, open_database, ConfigOverrides};
use crate::{storage::StoreCounts, Result};

/// Handle the status command
pub fn handle_status(overrides: &ConfigOverrides, as_json: bool) -> Result<StoreCounts> {
    let config = load_settings(overrides)?;
    let path = config.database_path()?;
    let db = open_database(&config)?;
    let counts = db.counts()?;

    // tarpaulin::skip - console output
    if as_json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("Database: {}", path.display());
        println!("  NBA teams      {:>8}", counts.nba_teams);
        println!("  fantasy teams  {:>8}", counts.fantasy_teams);
        println!("  players        {:>8}", counts.players);
        println!("  aliases        {:>8}", counts.aliases);
        println!("  roster slots   {:>8}", counts.rosters);
        println!("  schedule       {:>8}", counts.schedule);
        println!("  match-ups      {:>8}", counts.match_ups);
        println!("  game logs      {:>8}", counts.game_logs);
        match counts.latest_game_date {
            Some(date) => println!("  latest game    {:>10}", date),
            None => println!("  latest game          none"),
        }
    }
    Ok(counts)
}
