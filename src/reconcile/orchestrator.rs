//! Full reconciliation passes.
//!
//! A pass walks [`Phase::ORDER`]. Each phase fetches its listings first
//! (retrying transient failures), then applies them inside one transaction.
//! A phase that hits a fatal error is rolled back and ends the pass; the
//! phases before it stay committed.

use super::summary::{BatchReport, EntityKind, PhaseReport, PhaseStatus, RunMode, RunSummary};
use super::upsert::{apply_batch, UpsertEngine};
use crate::cli::types::Phase;
use crate::config::SeasonContext;
use crate::core::retry_with_backoff;
use crate::error::Result;
use crate::feed::LeagueFeed;
use crate::storage::LeagueDatabase;
use std::collections::BTreeSet;


/// Switches shared by both invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the phases before this one
    pub start_at: Option<Phase>,
    /// Clear rosters, match-ups and fantasy teams before an initial load
    pub reset_league: bool,
}

impl RunOptions {
    pub fn starting_at(phase: Phase) -> Self {
        Self {
            start_at: Some(phase),
            ..Self::default()
        }
    }
}

/// Runs reconciliation passes of one feed into one store.
pub struct Reconciler<'a> {
    db: &'a LeagueDatabase,
    feed: &'a dyn LeagueFeed,
    ctx: &'a SeasonContext,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a LeagueDatabase, feed: &'a dyn LeagueFeed, ctx: &'a SeasonContext) -> Self {
        Self { db, feed, ctx }
    }

    /// First load of a season.
    ///
    /// A store that already holds players is loaded anyway (the pass is an
    /// upsert) but a warning is logged.
    pub async fn initialize_season(&self, options: RunOptions) -> Result<RunSummary> {
        if options.reset_league {
            tracing::info!(season = %self.ctx.season.label(), "Resetting league tables");
            self.db.season_reset()?;
        }
        let existing = self.db.player_count()?;
        if existing > 0 {
            tracing::warn!(
                players = existing,
                "Player table is not empty; initial load will update existing rows"
            );
        }
        Ok(self.run(RunMode::InitializeSeason, options.start_at).await)
    }

    /// Periodic refresh during a season.
    pub async fn update_mid_season(&self, options: RunOptions) -> Result<RunSummary> {
        if options.reset_league {
            tracing::warn!("--reset-league only applies to an initial load; ignored");
        }
        Ok(self.run(RunMode::UpdateMidSeason, options.start_at).await)
    }

    async fn run(&self, mode: RunMode, start_at: Option<Phase>) -> RunSummary {
        let mut summary = RunSummary::new(mode, self.ctx.season, self.ctx.as_of);
        tracing::info!(
            %mode,
            season = %self.ctx.season.label(),
            as_of = %self.ctx.as_of,
            source = self.feed.source_name(),
            "Starting reconciliation"
        );

        let mut halted = false;
        for phase in Phase::ORDER {
            let skipped = start_at.is_some_and(|start| phase < start);
            if halted || skipped {
                summary.phases.push(PhaseReport {
                    phase,
                    status: PhaseStatus::NotRun,
                });
                continue;
            }

            tracing::info!(%phase, "Running phase");
            match self.run_phase(phase).await {
                Ok(report) => {
                    for (entity, c) in &report.counts {
                        tracing::info!(
                            %phase,
                            %entity,
                            inserted = c.inserted,
                            updated = c.updated,
                            unchanged = c.unchanged,
                            skipped = c.skipped,
                            deleted = c.deleted,
                            failed = c.failed,
                            "Phase complete"
                        );
                    }
                    summary.absorb(report);
                    summary.phases.push(PhaseReport {
                        phase,
                        status: PhaseStatus::Completed,
                    });
                }
                Err(e) => {
                    tracing::error!(%phase, "Phase aborted, rolled back: {}", e);
                    summary.phases.push(PhaseReport {
                        phase,
                        status: PhaseStatus::Aborted {
                            error: e.to_string(),
                        },
                    });
                    halted = true;
                }
            }
        }

        summary
    }

    /// Fetch and apply one phase. Any error returned here means nothing of
    /// this phase was committed.
    pub async fn run_phase(&self, phase: Phase) -> Result<BatchReport> {
        let retry = &self.ctx.retry;
        let feed = self.feed;

        match phase {
            Phase::FantasyTeams => {
                let listing =
                    retry_with_backoff(retry, "fantasy teams", || feed.fantasy_teams()).await?;
                self.apply(|engine, report| {
                    apply_batch(EntityKind::FantasyTeam, listing, report, |record| {
                        engine.upsert_fantasy_team(record)
                    })
                })
            }
            Phase::NbaTeams => {
                let listing = retry_with_backoff(retry, "NBA teams", || feed.nba_teams()).await?;
                self.apply(|engine, report| {
                    apply_batch(EntityKind::NbaTeam, listing, report, |record| {
                        engine.upsert_nba_team(record)
                    })
                })
            }
            Phase::Players => {
                let season = self.ctx.season;
                let players = retry_with_backoff(retry, "players", || feed.players()).await?;
                let salaries =
                    retry_with_backoff(retry, "salaries", || feed.salaries(season)).await?;
                self.apply(|engine, report| {
                    let unreadable = players.iter().filter(|row| row.is_err()).count();
                    // Failed rows still prove their players are listed
                    let mut listed = BTreeSet::new();
                    apply_batch(EntityKind::Player, players, report, |record| {
                        let source_id = record.source_id;
                        match engine.upsert_player(record) {
                            Ok((player_id, outcome)) => {
                                listed.insert(player_id);
                                Ok(outcome)
                            }
                            Err(e) => {
                                listed.extend(source_id);
                                listed.extend(e.candidate_ids());
                                Err(e)
                            }
                        }
                    })?;
                    if unreadable == 0 {
                        engine.deactivate_absent(&listed, report)?;
                    } else {
                        tracing::warn!(
                            unreadable,
                            "Unreadable player rows; nobody is marked inactive this run"
                        );
                    }
                    apply_batch(EntityKind::Player, salaries, report, |record| {
                        engine.apply_salary(record)
                    })
                })
            }
            Phase::Rosters => {
                let listing = retry_with_backoff(retry, "rosters", || feed.rosters()).await?;
                self.apply(|engine, report| engine.reconcile_rosters(listing, report))
            }
            Phase::Schedule => {
                let season = self.ctx.season;
                let listing =
                    retry_with_backoff(retry, "schedule", || feed.schedule(season)).await?;
                self.apply(|engine, report| {
                    apply_batch(EntityKind::ScheduleEntry, listing, report, |record| {
                        engine.insert_schedule_entry(record)
                    })
                })
            }
            Phase::MatchUps => {
                let listing = retry_with_backoff(retry, "match-ups", || feed.match_ups()).await?;
                self.apply(|engine, report| {
                    apply_batch(EntityKind::MatchUp, listing, report, |record| {
                        engine.insert_match_up(record)
                    })
                })
            }
            Phase::GameLogs => {
                let dates = self.game_log_dates()?;
                tracing::info!(dates = dates.len(), "Fetching box scores");

                let mut listing = Vec::new();
                for date in dates {
                    let what = format!("box scores for {}", date);
                    let rows = retry_with_backoff(retry, &what, || feed.box_scores(date)).await?;
                    listing.extend(rows);
                }
                self.apply(|engine, report| {
                    apply_batch(EntityKind::GameLogEntry, listing, report, |record| {
                        engine.insert_game_log(record)
                    })
                })
            }
        }
    }

    /// Scheduled dates from the latest stored game date (inclusive, so a
    /// partly loaded day is completed) through `as_of`.
    pub fn game_log_dates(&self) -> Result<Vec<chrono::NaiveDate>> {
        let latest = self.db.latest_game_date()?;
        self.db.schedule_dates_between(latest, self.ctx.as_of)
    }

    fn apply<F>(&self, f: F) -> Result<BatchReport>
    where
        F: FnOnce(&mut UpsertEngine<'_>, &mut BatchReport) -> Result<()>,
    {
        self.db.in_transaction(|tx| {
            let mut engine = UpsertEngine::new(tx, self.ctx.normalizer.clone())?;
            let mut report = BatchReport::default();
            f(&mut engine, &mut report)?;
            Ok(report)
        })
    }
}
