use chrono::Utc;
use run_sheet::{
    IdGenerator, NewRunSheet, RunSheetDocument, RunSheetStore, RunSheetSummary, UuidIds,
};
use shared::{
    domain::{matches_search, Choice, RunSheetCategory, RunSheetId, RunSheetStatus},
    error::ApiError,
};
use tracing::info;

use crate::{
    directory::{require_current, require_lead, UserDirectory},
    internal, required, ApiContext,
};

#[derive(Debug, Clone, Default)]
pub struct RunSheetFilter {
    pub search: String,
    pub status: Choice<RunSheetStatus>,
    pub category: Choice<RunSheetCategory>,
}

impl RunSheetFilter {
    fn matches(&self, summary: &RunSheetSummary) -> bool {
        let meta = &summary.meta;
        matches_search(&self.search, &[meta.title.as_str()])
            && self.status.matches(&meta.status)
            && self.category.matches(&meta.category)
    }
}

/// Creates a sheet seeded from the chosen template. The sheet and its seed
/// items are stored in one step.
pub async fn create_run_sheet(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    mut new: NewRunSheet,
) -> Result<RunSheetDocument, ApiError> {
    let author = require_current(directory).await?;
    new.title = required(&new.title, "title")?;

    let seed = new.template.seed(UuidIds).into_items();
    let snapshot = ctx
        .storage
        .create_run_sheet(&new, author.id, &seed)
        .await
        .map_err(internal)?;
    let document = RunSheetDocument::from_snapshot(snapshot).map_err(|err| internal(err.into()))?;

    info!(
        run_sheet_id = %document.meta().id,
        template = %new.template,
        items = document.items().len(),
        "run sheet created"
    );
    Ok(document)
}

pub async fn list_run_sheets(
    ctx: &ApiContext,
    filter: &RunSheetFilter,
) -> Result<Vec<RunSheetSummary>, ApiError> {
    let summaries = ctx
        .storage
        .list_run_sheet_summaries()
        .await
        .map_err(internal)?;
    Ok(summaries
        .into_iter()
        .filter(|summary| filter.matches(summary))
        .collect())
}

pub async fn open_run_sheet(
    ctx: &ApiContext,
    run_sheet_id: RunSheetId,
) -> Result<RunSheetDocument, ApiError> {
    let snapshot = ctx
        .storage
        .load_snapshot(run_sheet_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("run sheet {run_sheet_id}")))?;
    RunSheetDocument::from_snapshot(snapshot).map_err(|err| internal(err.into()))
}

/// Persists the whole document and clears its dirty flag.
pub async fn save_run_sheet<G: IdGenerator>(
    ctx: &ApiContext,
    document: &mut RunSheetDocument<G>,
) -> Result<(), ApiError> {
    let saved_at = Utc::now();
    let mut snapshot = document.snapshot();
    snapshot.meta.updated_at = saved_at;
    ctx.storage
        .save_snapshot(&snapshot)
        .await
        .map_err(internal)?;
    document.mark_saved(saved_at);
    Ok(())
}

pub async fn set_run_sheet_status(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    run_sheet_id: RunSheetId,
    status: RunSheetStatus,
) -> Result<(), ApiError> {
    let lead = require_lead(directory).await?;
    let updated = ctx
        .storage
        .set_run_sheet_status(run_sheet_id, status)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("run sheet {run_sheet_id}")));
    }
    info!(%run_sheet_id, %status, by = %lead.id, "run sheet status changed");
    Ok(())
}

pub async fn delete_run_sheet(
    ctx: &ApiContext,
    directory: &dyn UserDirectory,
    run_sheet_id: RunSheetId,
) -> Result<(), ApiError> {
    require_lead(directory).await?;
    let deleted = ctx
        .storage
        .delete_run_sheet(run_sheet_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found(format!("run sheet {run_sheet_id}")));
    }
    Ok(())
}

/// Pretty JSON of the stored sheet, metadata and items in order.
pub async fn export_run_sheet(
    ctx: &ApiContext,
    run_sheet_id: RunSheetId,
) -> Result<String, ApiError> {
    let document = open_run_sheet(ctx, run_sheet_id).await?;
    document.to_json().map_err(|err| internal(err.into()))
}
