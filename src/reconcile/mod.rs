//! Reconciliation engine
//!
//! - `normalize`: name comparison keys
//! - `resolver`: incoming name to canonical player
//! - `upsert`: per-record insert/update/skip against the store
//! - `orchestrator`: phase ordering, retries and per-phase transactions
//! - `summary`: what a pass changed and what it could not apply

pub mod normalize;
pub mod orchestrator;
pub mod resolver;
pub mod summary;
pub mod upsert;

pub use normalize::NameNormalizer;
pub use orchestrator::{Reconciler, RunOptions};
pub use resolver::{MatchStage, NameIndex, NameQuery, Resolution};
pub use summary::{
    AmbiguityReport, BatchReport, ChangeCounts, DanglingReport, EntityKind, Outcome, PhaseReport,
    PhaseStatus, RecordWarning, RunMode, RunSummary,
};
pub use upsert::{apply_batch, UpsertEngine};
