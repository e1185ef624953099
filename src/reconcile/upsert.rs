//! Per-record writes against the store.
//!
//! Mutable entities (teams, players) are inserted with defaults or updated
//! field by field. Append-only entities (schedule, match-ups, game logs) are
//! inserted once; an existing key is a skip, never an overwrite. Every
//! operation first checks the parents it references so a dangling record
//! fails alone instead of tripping a foreign key.

use super::resolver::{NameIndex, NameQuery, Resolution};
use super::summary::{BatchReport, EntityKind, Outcome};
use super::NameNormalizer;
use crate::cli::types::{FantasyTeamId, PlayerId, PlayerStatus};
use crate::error::{Result, SyncError};
use crate::feed::{
    FantasyTeamRecord, GameLogRecord, Listing, MatchUpRecord, NbaTeamRecord, PlayerRecord,
    PlayerRef, RosterRecord, SalaryRecord, ScheduleRecord,
};
use crate::storage::{
    FantasyTeam, GameLogEntry, LeagueDatabase, MatchUp, NbaTeam, Player, RosterEntry,
    ScheduleEntry,
};
use std::collections::{BTreeMap, BTreeSet};


/// Apply `apply` to every row of a listing.
///
/// Record-level errors are filed in `report` and the batch moves on:
/// unresolved names as warnings, everything else as a failed record. Any
/// other error stops the batch and is returned.
pub fn apply_batch<T, F>(
    entity: EntityKind,
    listing: Listing<T>,
    report: &mut BatchReport,
    mut apply: F,
) -> Result<()>
where
    F: FnMut(T) -> Result<Outcome>,
{
    for row in listing {
        match row.and_then(&mut apply) {
            Ok(outcome) => report.record(entity, outcome),
            Err(e) => file_record_error(entity, e, report)?,
        }
    }
    Ok(())
}

fn file_record_error(
    entity: EntityKind,
    error: SyncError,
    report: &mut BatchReport,
) -> Result<()> {
    if !error.is_record_level() {
        return Err(error);
    }
    tracing::warn!(%entity, "Skipping record: {}", error);
    match error {
        SyncError::Unresolved { .. } => report.warn(entity, error),
        other => report.fail(entity, other),
    }
    Ok(())
}

fn storable(entity: &'static str, player_id: PlayerId) -> Result<PlayerId> {
    if !player_id.is_storable() {
        return Err(SyncError::InvalidRecord {
            entity,
            reason: format!("player id {} is out of range", player_id),
        });
    }
    Ok(player_id)
}

fn dangling(entity: &'static str, target: &'static str, reference: impl ToString) -> SyncError {
    SyncError::DanglingReference {
        entity,
        target,
        reference: reference.to_string(),
    }
}

/// Stored roster pairs that failed rows vouch for
#[derive(Debug, Default)]
struct HeldPairs {
    everything: bool,
    teams: BTreeSet<FantasyTeamId>,
    players: BTreeSet<PlayerId>,
}

impl HeldPairs {
    fn covers(&self, entry: &RosterEntry) -> bool {
        self.everything
            || self.teams.contains(&entry.team_id)
            || self.players.contains(&entry.player_id)
    }
}

/// Writes records through one store handle, keeping a name index of every
/// stored player current as players and aliases are added.
pub struct UpsertEngine<'db> {
    db: &'db LeagueDatabase,
    index: NameIndex,
}

impl<'db> UpsertEngine<'db> {
    /// Snapshot the stored players into a fresh name index.
    pub fn new(db: &'db LeagueDatabase, normalizer: NameNormalizer) -> Result<Self> {
        let players = db.list_players()?;
        let index = NameIndex::from_players(normalizer, &players);
        Ok(Self { db, index })
    }

    /// Resolve a name to a stored player; no match is an `Unresolved` error.
    pub fn resolve_name(&self, name: &str, team_hint: Option<&str>) -> Result<PlayerId> {
        match self
            .index
            .resolve(NameQuery::new(name).with_team_hint(team_hint))?
        {
            Resolution::Matched { player_id, .. } => Ok(player_id),
            Resolution::Unresolved => Err(SyncError::Unresolved {
                name: name.to_string(),
            }),
        }
    }

    // --- Mutable entities ------------------------------------------------

    pub fn upsert_fantasy_team(&self, record: FantasyTeamRecord) -> Result<Outcome> {
        let incoming = FantasyTeam {
            team_id: record.team_id,
            team_name: record.team_name,
            manager: record.manager,
        };
        match self.db.get_fantasy_team(incoming.team_id)? {
            None => {
                self.db.insert_fantasy_team(&incoming)?;
                Ok(Outcome::Inserted)
            }
            Some(stored) if stored == incoming => Ok(Outcome::Unchanged),
            Some(_) => {
                self.db.update_fantasy_team(&incoming)?;
                Ok(Outcome::Updated)
            }
        }
    }

    pub fn upsert_nba_team(&self, record: NbaTeamRecord) -> Result<Outcome> {
        let incoming = NbaTeam {
            team_id: record.team_id,
            team_name: record.team_name,
            team_code: record.team_code,
        };
        match self.db.get_nba_team(incoming.team_id)? {
            None => {
                self.db.insert_nba_team(&incoming)?;
                Ok(Outcome::Inserted)
            }
            Some(stored) if stored == incoming => Ok(Outcome::Unchanged),
            Some(_) => {
                self.db.update_nba_team(&incoming)?;
                Ok(Outcome::Updated)
            }
        }
    }

    /// Insert or update a listed player and return its id.
    ///
    /// Identity is the source id when given, else the resolved name; a name
    /// that resolves to nobody is a new player under the next free id. A new
    /// player may not take a name already recorded as someone's alias.
    /// Fields absent from the record keep their stored values. A listed
    /// player is always available, and a listed `Inactive` player without a
    /// status of its own comes back as `Active`.
    pub fn upsert_player(&mut self, record: PlayerRecord) -> Result<(PlayerId, Outcome)> {
        if let Some(team_id) = record.nba_team {
            if self.db.get_nba_team(team_id)?.is_none() {
                return Err(dangling("player", "NBA team", team_id));
            }
        }

        let player_id = match record.source_id {
            Some(id) => storable("player", id)?,
            None => match self.index.resolve(NameQuery::new(&record.name))? {
                Resolution::Matched { player_id, .. } => player_id,
                Resolution::Unresolved => self.db.next_player_id()?,
            },
        };

        let Some(stored) = self.db.get_player(player_id)? else {
            // A recorded alias keeps resolving to its owner
            if let Some(owner) = self.index.alias_owners(&record.name).into_iter().next() {
                return Err(SyncError::InvalidRecord {
                    entity: "player",
                    reason: format!(
                        "new player #{} is named '{}', an alias of player #{}",
                        player_id, record.name, owner
                    ),
                });
            }
            let mut player = Player::new(player_id, &record.name);
            player.nba_team_id = record.nba_team;
            if let Some(positions) = record.positions {
                player.positions = positions;
            }
            if let Some(status) = record.status {
                player.status = status;
            }
            self.db.insert_player(&player)?;
            self.index.insert_player(player_id, &player.name);
            tracing::debug!(%player_id, name = %player.name, "Inserted player");
            return Ok((player_id, Outcome::Inserted));
        };

        let mut merged = stored.clone();
        if let Some(team_id) = record.nba_team {
            merged.nba_team_id = Some(team_id);
        }
        if let Some(positions) = record.positions {
            merged.positions = positions;
        }
        match record.status {
            Some(status) => merged.status = status,
            None if stored.status == PlayerStatus::Inactive => {
                merged.status = PlayerStatus::Active;
            }
            None => {}
        }
        merged.is_available = true;

        let alias_added =
            record.name != stored.name && self.record_alias(player_id, &record.name)?;

        if merged != stored {
            self.db.update_player(&merged)?;
            Ok((player_id, Outcome::Updated))
        } else if alias_added {
            Ok((player_id, Outcome::Updated))
        } else {
            Ok((player_id, Outcome::Unchanged))
        }
    }

    /// Flag every stored player missing from `listed` as `Inactive` and
    /// unavailable. Players already inactive are left alone.
    pub fn deactivate_absent(
        &self,
        listed: &BTreeSet<PlayerId>,
        report: &mut BatchReport,
    ) -> Result<()> {
        for mut player in self.db.list_players()? {
            if listed.contains(&player.player_id) || player.status == PlayerStatus::Inactive {
                continue;
            }
            tracing::info!(
                player_id = %player.player_id,
                name = %player.name,
                "Marking player inactive"
            );
            player.status = PlayerStatus::Inactive;
            player.is_available = false;
            self.db.update_player(&player)?;
            report.record(EntityKind::Player, Outcome::Updated);
        }
        Ok(())
    }

    /// Set a resolved player's salary; no other field is touched.
    pub fn apply_salary(&self, record: SalaryRecord) -> Result<Outcome> {
        let player_id = self.resolve_name(&record.player_name, None)?;
        let Some(mut player) = self.db.get_player(player_id)? else {
            return Err(dangling("salary", "player", player_id));
        };
        if player.salary == Some(record.salary) {
            return Ok(Outcome::Unchanged);
        }
        player.salary = Some(record.salary);
        self.db.update_player(&player)?;
        Ok(Outcome::Updated)
    }

    // --- Aliases ---------------------------------------------------------

    /// Remember `name` as an alias of `player_id` when it adds information.
    ///
    /// Nothing is recorded when `name` is the player's canonical name or
    /// already one of its aliases, or when it exactly names a different
    /// player. Returns whether an alias was added.
    pub fn record_alias(&mut self, player_id: PlayerId, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.index.canonical_name(player_id) == Some(name) {
            return Ok(false);
        }
        let owners = self.index.exact_owners(name);
        if owners.iter().any(|owner| *owner != player_id) {
            tracing::debug!(%player_id, alias = name, "Alias names another player; not recorded");
            return Ok(false);
        }
        if owners.contains(&player_id) {
            return Ok(false);
        }

        let added = self.db.add_alias(player_id, name)?;
        if added {
            self.index.insert_alias(player_id, name);
            tracing::info!(%player_id, alias = name, "Recorded alias");
        }
        Ok(added)
    }

    /// Manually curated alias. Unlike [`Self::record_alias`] every refusal is
    /// an error the caller sees.
    pub fn add_alias(&mut self, player_id: PlayerId, alias: &str) -> Result<bool> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(SyncError::InvalidRecord {
                entity: "alias",
                reason: "alias is empty".to_string(),
            });
        }
        if self.index.canonical_name(player_id).is_none() {
            return Err(dangling("alias", "player", player_id));
        }
        if let Some(other) = self
            .index
            .exact_owners(alias)
            .into_iter()
            .find(|owner| *owner != player_id)
        {
            return Err(SyncError::InvalidRecord {
                entity: "alias",
                reason: format!("'{}' already names player #{}", alias, other),
            });
        }
        self.record_alias(player_id, alias)
    }

    // --- Rosters ---------------------------------------------------------

    /// Resolve one roster row to a `(player, team)` pair.
    pub fn resolve_roster_entry(&self, record: &RosterRecord) -> Result<RosterEntry> {
        if self.db.get_fantasy_team(record.team_id)?.is_none() {
            return Err(dangling("roster", "fantasy team", record.team_id));
        }
        let player_id = match &record.player {
            PlayerRef::Id(id) => {
                let id = storable("roster", *id)?;
                if !self.db.player_exists(id)? {
                    return Err(dangling("roster", "player", id));
                }
                id
            }
            PlayerRef::Name(name) => self.resolve_name(name, None)?,
        };
        Ok(RosterEntry {
            player_id,
            team_id: record.team_id,
        })
    }

    /// Make the stored roster set equal the fetched one.
    ///
    /// Stored pairs missing upstream are deleted, fetched pairs missing from
    /// the store are inserted, and the intersection is left alone. A player
    /// listed on two teams keeps neither pair.
    ///
    /// A row that fails to resolve still says something about the store:
    /// its team and any ambiguity candidates keep their stored pairs
    /// (counted as skipped) unless a resolved row moves the player. An
    /// unreadable row holds every stored pair.
    pub fn reconcile_rosters(
        &self,
        listing: Listing<RosterRecord>,
        report: &mut BatchReport,
    ) -> Result<()> {
        let mut by_player: BTreeMap<PlayerId, BTreeSet<FantasyTeamId>> = BTreeMap::new();
        let mut held = HeldPairs::default();
        for row in listing {
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    held.everything = true;
                    file_record_error(EntityKind::Roster, e, report)?;
                    continue;
                }
            };
            match self.resolve_roster_entry(&record) {
                Ok(entry) => {
                    by_player
                        .entry(entry.player_id)
                        .or_default()
                        .insert(entry.team_id);
                }
                Err(e) => {
                    held.teams.insert(record.team_id);
                    held.players.extend(e.candidate_ids());
                    file_record_error(EntityKind::Roster, e, report)?;
                }
            }
        }

        let mut fetched = BTreeSet::new();
        for (player_id, teams) in &by_player {
            if teams.len() > 1 {
                let teams: Vec<String> = teams.iter().map(ToString::to_string).collect();
                report.fail(
                    EntityKind::Roster,
                    SyncError::InvalidRecord {
                        entity: "roster",
                        reason: format!(
                            "player #{} listed on teams {}",
                            player_id,
                            teams.join(", ")
                        ),
                    },
                );
                continue;
            }
            fetched.extend(teams.iter().map(|&team_id| RosterEntry {
                player_id: *player_id,
                team_id,
            }));
        }

        let stored = self.db.list_roster_entries()?;
        for entry in stored.difference(&fetched) {
            if !by_player.contains_key(&entry.player_id) && held.covers(entry) {
                tracing::debug!(
                    player_id = %entry.player_id,
                    team_id = %entry.team_id,
                    "Keeping roster pair behind a failed row"
                );
                report.record(EntityKind::Roster, Outcome::Skipped);
                continue;
            }
            self.db.delete_roster_entry(entry)?;
            report.record(EntityKind::Roster, Outcome::Deleted);
        }
        for entry in fetched.difference(&stored) {
            self.db.insert_roster_entry(entry)?;
            report.record(EntityKind::Roster, Outcome::Inserted);
        }
        for _ in fetched.intersection(&stored) {
            report.record(EntityKind::Roster, Outcome::Unchanged);
        }
        Ok(())
    }

    // --- Append-only entities --------------------------------------------

    pub fn insert_schedule_entry(&self, record: ScheduleRecord) -> Result<Outcome> {
        let home = self
            .db
            .find_nba_team(&record.home_team)?
            .ok_or_else(|| dangling("schedule entry", "NBA team", &record.home_team))?;
        let away = self
            .db
            .find_nba_team(&record.away_team)?
            .ok_or_else(|| dangling("schedule entry", "NBA team", &record.away_team))?;

        let entry = ScheduleEntry {
            game_date: record.game_date,
            home_team_id: home.team_id,
            away_team_id: away.team_id,
        };
        if self.db.schedule_entry_exists(&entry)? {
            return Ok(Outcome::Skipped);
        }
        self.db.insert_schedule_entry(&entry)?;
        Ok(Outcome::Inserted)
    }

    pub fn insert_match_up(&self, record: MatchUpRecord) -> Result<Outcome> {
        if self.db.get_fantasy_team(record.team_id)?.is_none() {
            return Err(dangling("match-up", "fantasy team", record.team_id));
        }
        if self.db.get_match_up(record.team_id, record.week)?.is_some() {
            return Ok(Outcome::Skipped);
        }
        self.db.insert_match_up(&MatchUp {
            team_id: record.team_id,
            week: record.week,
            week_start: record.week_start,
            week_end: record.week_end,
            is_playoffs: record.is_playoffs,
        })?;
        Ok(Outcome::Inserted)
    }

    pub fn insert_game_log(&self, record: GameLogRecord) -> Result<Outcome> {
        let player_id = self.resolve_name(&record.player_name, record.team.as_deref())?;
        if self.db.get_game_log(player_id, record.game_date)?.is_some() {
            return Ok(Outcome::Skipped);
        }
        self.db.insert_game_log(&GameLogEntry {
            player_id,
            game_date: record.game_date,
            stats: record.stats,
        })?;
        Ok(Outcome::Inserted)
    }
}
