use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{RunSheetId, UserId};

use crate::{
    document::{NewRunSheet, RunSheetSnapshot},
    item::RunSheetItem,
};

/// Persistence collaborator for run sheets. Nothing in this crate calls it on
/// its own; the host saves when the user asks it to.
#[async_trait]
pub trait RunSheetStore: Send + Sync {
    /// Stores a new draft sheet together with its seed `items`. Either both
    /// land or neither does.
    async fn create_run_sheet(
        &self,
        new: &NewRunSheet,
        created_by: UserId,
        items: &[RunSheetItem],
    ) -> Result<RunSheetSnapshot>;
    async fn load_snapshot(&self, run_sheet_id: RunSheetId) -> Result<Option<RunSheetSnapshot>>;
    /// Replaces the stored metadata and item order with `snapshot`.
    async fn save_snapshot(&self, snapshot: &RunSheetSnapshot) -> Result<()>;
}
