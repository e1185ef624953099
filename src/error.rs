//! Error types for the league reconciliation engine

use crate::cli::types::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;


pub type Result<T> = std::result::Result<T, SyncError>;

/// A stored player that an incoming name could refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub player_id: PlayerId,
    pub name: String,
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.player_id)
    }
}

fn join_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Ambiguous player name '{name}': matches {}", join_candidates(candidates))]
    Ambiguity {
        name: String,
        candidates: Vec<Candidate>,
    },

    #[error("{entity} references missing {target} '{reference}'")]
    DanglingReference {
        entity: &'static str,
        target: &'static str,
        reference: String,
    },

    #[error("No stored player matches '{name}'")]
    Unresolved { name: String },

    #[error("Invalid {entity} record: {reason}")]
    InvalidRecord {
        entity: &'static str,
        reason: String,
    },

    #[error("Fetching {source_name} failed: {message}")]
    UpstreamFetch {
        source_name: String,
        message: String,
        transient: bool,
    },

    #[error("Store rejected write: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("League ID not provided and {env_var} environment variable not set")]
    MissingLeagueId { env_var: String },

    #[error("Failed to parse id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("Invalid position: {position}")]
    InvalidPosition { position: String },

    #[error("Invalid player status: {status}")]
    InvalidStatus { status: String },
}

impl SyncError {
    /// Errors scoped to a single record. These are collected into the run
    /// summary and never abort the rest of the batch.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            SyncError::Ambiguity { .. }
                | SyncError::DanglingReference { .. }
                | SyncError::Unresolved { .. }
                | SyncError::InvalidRecord { .. }
                | SyncError::InvalidDate { .. }
                | SyncError::InvalidPosition { .. }
                | SyncError::InvalidStatus { .. }
        )
    }

    /// Stored players an ambiguous name could refer to; empty for every
    /// other error.
    pub fn candidate_ids(&self) -> Vec<PlayerId> {
        match self {
            SyncError::Ambiguity { candidates, .. } => {
                candidates.iter().map(|c| c.player_id).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether a failed upstream fetch may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::UpstreamFetch { transient, .. } => *transient,
            SyncError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }

    pub fn upstream(
        source_name: impl Into<String>,
        message: impl Into<String>,
        transient: bool,
    ) -> Self {
        SyncError::UpstreamFetch {
            source_name: source_name.into(),
            message: message.into(),
            transient,
        }
    }
}

/// SQLite constraint failures become `ConstraintViolation`; everything
/// else stays a plain database error.
impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                SyncError::ConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => SyncError::Database(err),
        }
    }
}
