//! Run summary: what one reconciliation pass changed, skipped and failed.

use crate::cli::types::{Phase, Season};
use crate::error::{Candidate, SyncError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FantasyTeam,
    NbaTeam,
    Player,
    Roster,
    ScheduleEntry,
    MatchUp,
    GameLogEntry,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::FantasyTeam => "fantasy team",
            EntityKind::NbaTeam => "NBA team",
            EntityKind::Player => "player",
            EntityKind::Roster => "roster",
            EntityKind::ScheduleEntry => "schedule entry",
            EntityKind::MatchUp => "match-up",
            EntityKind::GameLogEntry => "game log",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a single upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Updated,
    /// Existing row already held the incoming values
    Unchanged,
    /// Existing key on an append-only entity; the incoming row was ignored
    Skipped,
    Deleted,
}

/// Per-entity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
    pub deleted: u32,
    pub failed: u32,
}

impl ChangeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Deleted => self.deleted += 1,
        }
    }

    /// Rows whose stored state actually changed
    pub fn net_changes(&self) -> u32 {
        self.inserted + self.updated + self.deleted
    }

    pub fn merge(&mut self, other: &ChangeCounts) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
        self.failed += other.failed;
    }
}

/// Name that matched several stored players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityReport {
    pub entity: EntityKind,
    pub name: String,
    pub candidates: Vec<Candidate>,
}

/// Record that pointed at a parent row that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReport {
    pub entity: EntityKind,
    pub target: String,
    pub reference: String,
}

/// Any other per-record problem: unresolved names, malformed records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWarning {
    pub entity: EntityKind,
    pub message: String,
}

/// Per-record failures of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issues {
    pub ambiguities: Vec<AmbiguityReport>,
    pub dangling: Vec<DanglingReport>,
    pub warnings: Vec<RecordWarning>,
}

impl Issues {
    /// File a record-level error under the right list.
    pub fn push(&mut self, entity: EntityKind, error: SyncError) {
        match error {
            SyncError::Ambiguity { name, candidates } => self.ambiguities.push(AmbiguityReport {
                entity,
                name,
                candidates,
            }),
            SyncError::DanglingReference {
                target, reference, ..
            } => self.dangling.push(DanglingReport {
                entity,
                target: target.to_string(),
                reference,
            }),
            other => self.warnings.push(RecordWarning {
                entity,
                message: other.to_string(),
            }),
        }
    }

    pub fn extend(&mut self, other: Issues) {
        self.ambiguities.extend(other.ambiguities);
        self.dangling.extend(other.dangling);
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.ambiguities.is_empty() && self.dangling.is_empty() && self.warnings.is_empty()
    }
}

/// Counts and failures for one batch of one entity type
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub counts: BTreeMap<EntityKind, ChangeCounts>,
    pub issues: Issues,
}

impl BatchReport {
    pub fn record(&mut self, entity: EntityKind, outcome: Outcome) {
        self.counts.entry(entity).or_default().record(outcome);
    }

    pub fn fail(&mut self, entity: EntityKind, error: SyncError) {
        self.counts.entry(entity).or_default().failed += 1;
        self.issues.push(entity, error);
    }

    /// Note a data-quality problem that is not a failed write.
    pub fn warn(&mut self, entity: EntityKind, error: SyncError) {
        self.issues.push(entity, error);
    }

    pub fn counts_for(&self, entity: EntityKind) -> ChangeCounts {
        self.counts.get(&entity).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: BatchReport) {
        for (entity, counts) in &other.counts {
            self.counts.entry(*entity).or_default().merge(counts);
        }
        self.issues.extend(other.issues);
    }
}

/// How a phase ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Aborted { error: String },
    NotRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub status: PhaseStatus,
}

/// Which invocation produced the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    InitializeSeason,
    UpdateMidSeason,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::InitializeSeason => f.write_str("init-season"),
            RunMode::UpdateMidSeason => f.write_str("update-season"),
        }
    }
}

/// Structured report of one full pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub season: Season,
    pub as_of: NaiveDate,
    pub phases: Vec<PhaseReport>,
    pub counts: BTreeMap<EntityKind, ChangeCounts>,
    pub ambiguities: Vec<AmbiguityReport>,
    pub dangling: Vec<DanglingReport>,
    pub warnings: Vec<RecordWarning>,
}

impl RunSummary {
    pub fn new(mode: RunMode, season: Season, as_of: NaiveDate) -> Self {
        Self {
            mode,
            season,
            as_of,
            phases: Vec::new(),
            counts: BTreeMap::new(),
            ambiguities: Vec::new(),
            dangling: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn absorb(&mut self, report: BatchReport) {
        for (entity, counts) in &report.counts {
            self.counts.entry(*entity).or_default().merge(counts);
        }
        self.ambiguities.extend(report.issues.ambiguities);
        self.dangling.extend(report.issues.dangling);
        self.warnings.extend(report.issues.warnings);
    }

    pub fn counts_for(&self, entity: EntityKind) -> ChangeCounts {
        self.counts.get(&entity).copied().unwrap_or_default()
    }

    /// Inserted + updated + deleted rows across every entity type
    pub fn net_changes(&self) -> u32 {
        self.counts.values().map(ChangeCounts::net_changes).sum()
    }

    pub fn aborted_phase(&self) -> Option<&PhaseReport> {
        self.phases
            .iter()
            .find(|p| matches!(p.status, PhaseStatus::Aborted { .. }))
    }

    pub fn is_complete(&self) -> bool {
        self.phases
            .iter()
            .all(|p| p.status == PhaseStatus::Completed)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: season {} as of {}",
            self.mode,
            self.season.label(),
            self.as_of
        )?;
        writeln!(f)?;
        for phase in &self.phases {
            let state = match &phase.status {
                PhaseStatus::Completed => "✓".to_string(),
                PhaseStatus::Aborted { error } => format!("✗ aborted: {}", error),
                PhaseStatus::NotRun => "- not run".to_string(),
            };
            writeln!(f, "  {:<14} {}", phase.phase.to_string(), state)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "  {:<15} {:>8} {:>8} {:>9} {:>8} {:>8} {:>7}",
            "entity", "inserted", "updated", "unchanged", "skipped", "deleted", "failed"
        )?;
        for (entity, c) in &self.counts {
            writeln!(
                f,
                "  {:<15} {:>8} {:>8} {:>9} {:>8} {:>8} {:>7}",
                entity.label(),
                c.inserted,
                c.updated,
                c.unchanged,
                c.skipped,
                c.deleted,
                c.failed
            )?;
        }

        if !self.ambiguities.is_empty() {
            writeln!(f)?;
            writeln!(f, "Ambiguous names (add an alias to resolve):")?;
            for a in &self.ambiguities {
                let candidates: Vec<String> = a.candidates.iter().map(|c| c.to_string()).collect();
                writeln!(f, "  [{}] '{}' -> {}", a.entity, a.name, candidates.join(", "))?;
            }
        }
        if !self.dangling.is_empty() {
            writeln!(f)?;
            writeln!(f, "Dangling references:")?;
            for d in &self.dangling {
                writeln!(f, "  [{}] missing {} '{}'", d.entity, d.target, d.reference)?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  [{}] {}", w.entity, w.message)?;
            }
        }
        Ok(())
    }
}
