//! Identity resolution: map an incoming player name to a canonical player.
//!
//! Resolution is an ordered chain of pure stages over a [`NameIndex`]
//! snapshot:
//!
//! 1. exact match on the canonical name
//! 2. exact match on a recorded alias
//! 3. match on the normalized form of canonical names and aliases
//!
//! Each stage either matches one player, reports an ambiguity, or defers to
//! the next stage. Lookups never mutate the index; growing the alias set is
//! the upsert engine's call.

use super::normalize::NameNormalizer;
use crate::cli::types::PlayerId;
use crate::error::{Candidate, Result, SyncError};
use crate::storage::Player;
use std::collections::{BTreeMap, BTreeSet};

/// Which stage of the chain produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Canonical,
    Alias,
    Normalized,
}

/// Outcome of a successful resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched { player_id: PlayerId, stage: MatchStage },
    Unresolved,
}

/// Result of a single stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Match(PlayerId),
    Ambiguous(BTreeSet<PlayerId>),
    Defer,
}

impl StageResult {
    fn from_ids(ids: BTreeSet<PlayerId>) -> Self {
        match ids.len() {
            0 => StageResult::Defer,
            1 => ids
                .into_iter()
                .next()
                .map_or(StageResult::Defer, StageResult::Match),
            _ => StageResult::Ambiguous(ids),
        }
    }
}

/// A name to resolve, with an optional team hint carried into ambiguity
/// reports to help whoever curates aliases.
#[derive(Debug, Clone, Copy)]
pub struct NameQuery<'a> {
    pub name: &'a str,
    pub team_hint: Option<&'a str>,
}

impl<'a> NameQuery<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            team_hint: None,
        }
    }

    pub fn with_team_hint(mut self, team: Option<&'a str>) -> Self {
        self.team_hint = team;
        self
    }
}

/// In-memory lookup tables over every stored player's names.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    normalizer: NameNormalizer,
    canonical: BTreeMap<PlayerId, String>,
    by_canonical: BTreeMap<String, BTreeSet<PlayerId>>,
    by_alias: BTreeMap<String, BTreeSet<PlayerId>>,
    by_normalized: BTreeMap<String, BTreeSet<PlayerId>>,
}

impl NameIndex {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self {
            normalizer,
            ..Self::default()
        }
    }

    /// Build an index from stored players (aliases included).
    pub fn from_players<'p>(
        normalizer: NameNormalizer,
        players: impl IntoIterator<Item = &'p Player>,
    ) -> Self {
        let mut index = Self::new(normalizer);
        for player in players {
            index.insert_player(player.player_id, &player.name);
            for alias in &player.aliases {
                index.insert_alias(player.player_id, alias);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn canonical_name(&self, player_id: PlayerId) -> Option<&str> {
        self.canonical.get(&player_id).map(String::as_str)
    }

    pub fn insert_player(&mut self, player_id: PlayerId, name: &str) {
        self.canonical.insert(player_id, name.to_string());
        self.by_canonical
            .entry(name.to_string())
            .or_default()
            .insert(player_id);
        self.by_normalized
            .entry(self.normalizer.normalize(name))
            .or_default()
            .insert(player_id);
    }

    pub fn insert_alias(&mut self, player_id: PlayerId, alias: &str) {
        self.by_alias
            .entry(alias.to_string())
            .or_default()
            .insert(player_id);
        self.by_normalized
            .entry(self.normalizer.normalize(alias))
            .or_default()
            .insert(player_id);
    }

    /// Players whose canonical name or alias is exactly `name`
    pub fn exact_owners(&self, name: &str) -> BTreeSet<PlayerId> {
        let mut owners = BTreeSet::new();
        if let Some(ids) = self.by_canonical.get(name) {
            owners.extend(ids);
        }
        if let Some(ids) = self.by_alias.get(name) {
            owners.extend(ids);
        }
        owners
    }

    /// Players that have `name` recorded as an alias
    pub fn alias_owners(&self, name: &str) -> BTreeSet<PlayerId> {
        self.by_alias.get(name).cloned().unwrap_or_default()
    }

    /// Run the resolution chain.
    ///
    /// Returns `Err(SyncError::Ambiguity)` when any stage matches more than
    /// one distinct player.
    pub fn resolve(&self, query: NameQuery<'_>) -> Result<Resolution> {
        let stages: [(MatchStage, fn(&NameIndex, &str) -> StageResult); 3] = [
            (MatchStage::Canonical, exact_canonical),
            (MatchStage::Alias, exact_alias),
            (MatchStage::Normalized, normalized),
        ];

        for (stage, run) in stages {
            match run(self, query.name) {
                StageResult::Match(player_id) => {
                    return Ok(Resolution::Matched { player_id, stage })
                }
                StageResult::Ambiguous(ids) => return Err(self.ambiguity(query, ids)),
                StageResult::Defer => continue,
            }
        }
        Ok(Resolution::Unresolved)
    }

    fn ambiguity(&self, query: NameQuery<'_>, ids: BTreeSet<PlayerId>) -> SyncError {
        let name = match query.team_hint {
            Some(team) => format!("{} [{}]", query.name, team),
            None => query.name.to_string(),
        };
        SyncError::Ambiguity {
            name,
            candidates: ids
                .into_iter()
                .map(|player_id| Candidate {
                    player_id,
                    name: self
                        .canonical_name(player_id)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect(),
        }
    }
}

/// Stage 1: the name is some player's canonical name.
pub fn exact_canonical(index: &NameIndex, name: &str) -> StageResult {
    StageResult::from_ids(index.by_canonical.get(name).cloned().unwrap_or_default())
}

/// Stage 2: the name is a recorded alias.
pub fn exact_alias(index: &NameIndex, name: &str) -> StageResult {
    StageResult::from_ids(index.by_alias.get(name).cloned().unwrap_or_default())
}

/// Stage 3: the normalized name equals the normalized form of a canonical
/// name or alias.
pub fn normalized(index: &NameIndex, name: &str) -> StageResult {
    let key = index.normalizer.normalize(name);
    if key.is_empty() {
        return StageResult::Defer;
    }
    StageResult::from_ids(index.by_normalized.get(&key).cloned().unwrap_or_default())
}
