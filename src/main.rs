//! Entry point: parse CLI and dispatch to command handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use hoops_sync::{
    cli::{AliasCmd, Commands, HoopsSync},
    commands::{
        aliases::{handle_alias_add, handle_alias_list},
        season::{handle_init_season, handle_update_season, SeasonParams},
        status::handle_status,
    },
    reconcile::{RunOptions, RunSummary},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when a phase aborted and the run stopped early
const EXIT_PHASE_ABORTED: u8 = 2;

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app = HoopsSync::parse();

    // Logs go to stderr so `--json` output on stdout stays parseable
    let default_level = if app.global.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match app.command {
        Commands::InitSeason { args, reset_league } => {
            let params = SeasonParams {
                overrides: app.global.overrides(args.season),
                as_of: args.as_of,
                options: RunOptions {
                    start_at: args.start_at,
                    reset_league,
                },
                as_json: args.json,
            };
            let summary = handle_init_season(params)
                .await
                .context("init-season failed")?;
            Ok(exit_code(&summary))
        }

        Commands::UpdateSeason { args } => {
            let params = SeasonParams {
                overrides: app.global.overrides(args.season),
                as_of: args.as_of,
                options: RunOptions {
                    start_at: args.start_at,
                    reset_league: false,
                },
                as_json: args.json,
            };
            let summary = handle_update_season(params)
                .await
                .context("update-season failed")?;
            Ok(exit_code(&summary))
        }

        Commands::Alias { cmd } => {
            let overrides = app.global.overrides(None);
            match cmd {
                AliasCmd::Add { player_id, alias } => {
                    handle_alias_add(&overrides, player_id, &alias)
                        .with_context(|| format!("could not add alias '{}'", alias))?;
                }
                AliasCmd::List { player_id, json } => {
                    handle_alias_list(&overrides, player_id, json)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Status { json } => {
            handle_status(&app.global.overrides(None), json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(summary: &RunSummary) -> ExitCode {
    match summary.aborted_phase() {
        Some(phase) => {
            tracing::error!(phase = %phase.phase, "Run stopped early; rerun with --from to resume");
            ExitCode::from(EXIT_PHASE_ABORTED)
        }
        None => ExitCode::SUCCESS,
    }
}
