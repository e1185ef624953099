//! `init-season` and `update-season`: one full reconciliation pass each.

use chrono::NaiveDate;

use super::common::{print_summary, CommandContext, ConfigOverrides};
use crate::{
    reconcile::{Reconciler, RunOptions, RunSummary},
    Result,
};

/// Parameters shared by both season commands
#[derive(Debug, Clone, Default)]
pub struct SeasonParams {
    pub overrides: ConfigOverrides,
    pub as_of: Option<NaiveDate>,
    pub options: RunOptions,
    pub as_json: bool,
}

/// Handle the init-season command
pub async fn handle_init_season(params: SeasonParams) -> Result<RunSummary> {
    let ctx = CommandContext::new(&params.overrides, params.as_of)?;
    let reconciler = Reconciler::new(&ctx.db, ctx.feed.as_ref(), &ctx.season);
    let summary = reconciler.initialize_season(params.options).await?;
    print_summary(&summary, params.as_json)?;
    Ok(summary)
}

/// Handle the update-season command
pub async fn handle_update_season(params: SeasonParams) -> Result<RunSummary> {
    let ctx = CommandContext::new(&params.overrides, params.as_of)?;
    let reconciler = Reconciler::new(&ctx.db, ctx.feed.as_ref(), &ctx.season);
    let summary = reconciler.update_mid_season(params.options).await?;
    print_summary(&summary, params.as_json)?;
    Ok(summary)
}
