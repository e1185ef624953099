//! Shared setup for command handlers: layered config, the store and the feed.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::{
    cli::types::Season,
    config::{load_config, resolve_league_id, FeedSource, HoopsConfig, SeasonContext},
    feed::{HttpFeed, LeagueFeed, SnapshotFeed},
    reconcile::RunSummary,
    storage::LeagueDatabase,
    Result,
};

/// Global flags that override the config file and the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub season: Option<Season>,
}

impl ConfigOverrides {
    /// Apply the flags on top of an already loaded config. A feed flag
    /// replaces whichever feed the file or environment configured.
    pub fn apply(&self, config: &mut HoopsConfig) {
        if let Some(path) = &self.database {
            config.database = Some(path.clone());
        }
        if let Some(season) = self.season {
            config.season = Some(season);
        }
        if let Some(dir) = &self.snapshot_dir {
            config.feed.snapshot_dir = Some(dir.clone());
            config.feed.api_url = None;
        }
        if let Some(url) = &self.api_url {
            config.feed.api_url = Some(url.clone());
            config.feed.snapshot_dir = None;
        }
    }
}

/// Config file, then `HOOPS_SYNC_*` variables, then command-line flags.
pub fn load_settings(overrides: &ConfigOverrides) -> Result<HoopsConfig> {
    let mut config = load_config(overrides.config.as_deref())?;
    config.apply_env()?;
    overrides.apply(&mut config);
    Ok(config)
}

pub fn open_database(config: &HoopsConfig) -> Result<LeagueDatabase> {
    let path = config.database_path()?;
    tracing::debug!(path = %path.display(), "Opening league database");
    LeagueDatabase::open(&path)
}

/// Build the configured feed. The HTTP feed needs a league id.
pub fn build_feed(config: &HoopsConfig) -> Result<Box<dyn LeagueFeed>> {
    match config.feed_source()? {
        FeedSource::Snapshot(dir) => {
            tracing::info!(dir = %dir.display(), "Reading snapshot feed");
            Ok(Box::new(SnapshotFeed::new(dir)))
        }
        FeedSource::Http { url, timeout } => {
            let league_id = resolve_league_id(config.league_id)?;
            tracing::info!(%url, %league_id, "Using HTTP feed");
            Ok(Box::new(HttpFeed::new(url, timeout)?.with_league_id(league_id)))
        }
    }
}

/// Context containing the resources a reconciliation command needs
pub struct CommandContext {
    pub db: LeagueDatabase,
    pub feed: Box<dyn LeagueFeed>,
    pub season: SeasonContext,
}

impl CommandContext {
    pub fn new(overrides: &ConfigOverrides, as_of: Option<NaiveDate>) -> Result<Self> {
        let config = load_settings(overrides)?;
        let feed = build_feed(&config)?;
        let db = open_database(&config)?;
        let season = config.season_context(as_of);
        Ok(Self { db, feed, season })
    }
}

/// Print a run summary as text or JSON.
pub fn print_summary(summary: &RunSummary, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?); // tarpaulin::skip
    } else {
        print!("{}", summary); // tarpaulin::skip
    }
    Ok(())
}
