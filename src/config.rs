//! Configuration file, environment overrides and the per-run context.
//!
//! Precedence is file, then environment, then command-line flags. The
//! result becomes a [`SeasonContext`] that is handed to every phase.

use crate::cli::types::{LeagueId, Season};
use crate::core::RetryPolicy;
use crate::error::{Result, SyncError};
use crate::reconcile::NameNormalizer;
use crate::storage::LeagueDatabase;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable name for the league id
pub const LEAGUE_ID_ENV_VAR: &str = "HOOPS_SYNC_LEAGUE_ID";

/// Environment variable name for the feed base URL
pub const API_URL_ENV_VAR: &str = "HOOPS_SYNC_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub snapshot_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopsConfig {
    pub database: Option<PathBuf>,
    pub season: Option<Season>,
    pub league_id: Option<LeagueId>,
    pub feed: FeedConfig,
    pub retry: RetryPolicy,
    pub names: NameNormalizer,
}

/// Where listings are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Snapshot(PathBuf),
    Http { url: String, timeout: Duration },
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("hoops-sync.toml")
}

/// Load the config file. A missing default file yields the defaults; a
/// missing file that was asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<HoopsConfig> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(SyncError::Config {
                message: format!("config file {} not found", path.display()),
            });
        }
        return Ok(HoopsConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config = HoopsConfig::from_toml_str(&contents).map_err(|e| SyncError::Config {
        message: format!("{}: {}", path.display(), e),
    })?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

impl HoopsConfig {
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `HOOPS_SYNC_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(id) = var(LEAGUE_ID_ENV_VAR).filter(|s| !s.trim().is_empty()) {
            self.league_id = Some(id.parse().map_err(|_| SyncError::Config {
                message: format!("{} is not a league id: '{}'", LEAGUE_ID_ENV_VAR, id),
            })?);
        }
        if let Some(url) = var(API_URL_ENV_VAR).filter(|s| !s.trim().is_empty()) {
            self.feed.api_url = Some(url);
            self.feed.snapshot_dir = None;
        }
        Ok(())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => LeagueDatabase::default_path(),
        }
    }

    pub fn feed_source(&self) -> Result<FeedSource> {
        let timeout = Duration::from_secs(self.feed.timeout_secs.unwrap_or(30));
        match (&self.feed.snapshot_dir, &self.feed.api_url) {
            (Some(_), Some(_)) => Err(SyncError::Config {
                message: "set either feed.snapshot_dir or feed.api_url, not both".to_string(),
            }),
            (Some(dir), None) => Ok(FeedSource::Snapshot(dir.clone())),
            (None, Some(url)) => Ok(FeedSource::Http {
                url: url.clone(),
                timeout,
            }),
            (None, None) => Err(SyncError::Config {
                message: format!(
                    "no feed configured: pass --snapshot-dir or --api-url, or set {}",
                    API_URL_ENV_VAR
                ),
            }),
        }
    }

    pub fn season_context(&self, as_of: Option<NaiveDate>) -> SeasonContext {
        SeasonContext {
            season: self.season.unwrap_or_default(),
            league_id: self.league_id,
            as_of: as_of.unwrap_or_else(|| chrono::Local::now().date_naive()),
            retry: self.retry,
            normalizer: self.names.clone(),
        }
    }
}

/// Resolve a league id from an explicit value or `HOOPS_SYNC_LEAGUE_ID`.
pub fn resolve_league_id(league_id: Option<LeagueId>) -> Result<LeagueId> {
    league_id
        .or_else(|| {
            std::env::var(LEAGUE_ID_ENV_VAR)
                .ok()
                .and_then(|s| s.parse::<LeagueId>().ok())
        })
        .ok_or_else(|| SyncError::MissingLeagueId {
            env_var: LEAGUE_ID_ENV_VAR.to_string(),
        })
}

/// Everything a reconciliation run needs besides the store and the feed.
/// Built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonContext {
    pub season: Season,
    pub league_id: Option<LeagueId>,
    /// Latest date whose box scores are fetched
    pub as_of: NaiveDate,
    pub retry: RetryPolicy,
    pub normalizer: NameNormalizer,
}

impl SeasonContext {
    pub fn new(season: Season, as_of: NaiveDate) -> Self {
        Self {
            season,
            league_id: None,
            as_of,
            retry: RetryPolicy::default(),
            normalizer: NameNormalizer::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
