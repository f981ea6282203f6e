use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{RunSheetCategory, RunSheetId, RunSheetStatus, ServiceId, UserId};

use crate::{
    error::RunSheetError,
    ids::{IdGenerator, UuidIds},
    item::{ItemId, ItemPatch, ItemTemplate, RunSheetItem},
    list::OrderedItemList,
    template::RunSheetTemplate,
};

/// Container metadata for one run sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSheetMeta {
    pub id: RunSheetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: RunSheetCategory,
    pub status: RunSheetStatus,
    pub service_date: NaiveDate,
    pub service_time: NaiveTime,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRunSheet {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    pub category: RunSheetCategory,
    pub service_date: NaiveDate,
    pub service_time: NaiveTime,
    #[serde(default)]
    pub template: RunSheetTemplate,
}

/// Everything persisted for a run sheet: metadata plus items in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSheetSnapshot {
    pub meta: RunSheetMeta,
    pub items: Vec<RunSheetItem>,
}

impl RunSheetSnapshot {
    pub fn total_minutes(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.duration_minutes))
            .sum()
    }
}

/// Catalog row: metadata with aggregates computed by the store on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSheetSummary {
    pub meta: RunSheetMeta,
    pub item_count: u64,
    pub total_minutes: u64,
}

/// An open run sheet being edited in memory.
///
/// Every mutation applies immediately; `dirty` only records that something
/// changed since the host last persisted the document.
#[derive(Debug, Clone)]
pub struct RunSheetDocument<G = UuidIds> {
    meta: RunSheetMeta,
    items: OrderedItemList<G>,
    dirty: bool,
}

impl RunSheetDocument<UuidIds> {
    pub fn from_snapshot(snapshot: RunSheetSnapshot) -> Result<Self, RunSheetError> {
        Self::from_snapshot_with_ids(snapshot, UuidIds)
    }
}

impl<G: IdGenerator> RunSheetDocument<G> {
    pub fn from_snapshot_with_ids(
        snapshot: RunSheetSnapshot,
        ids: G,
    ) -> Result<Self, RunSheetError> {
        Ok(Self {
            meta: snapshot.meta,
            items: OrderedItemList::from_items(snapshot.items, ids)?,
            dirty: false,
        })
    }

    /// Seeds an empty sheet with the items of `template`.
    pub fn seeded(meta: RunSheetMeta, template: RunSheetTemplate, ids: G) -> Self {
        Self {
            meta,
            items: template.seed(ids),
            dirty: template != RunSheetTemplate::Blank,
        }
    }

    pub fn append(&mut self, template: ItemTemplate) -> &RunSheetItem {
        self.dirty = true;
        self.items.append(template)
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<RunSheetItem> {
        let removed = self.items.remove(id);
        self.dirty |= removed.is_some();
        removed
    }

    pub fn move_to(&mut self, id: &ItemId, new_index: i64) -> bool {
        let moved = self.items.move_to(id, new_index);
        self.dirty |= moved;
        moved
    }

    pub fn update(&mut self, id: &ItemId, patch: ItemPatch) -> bool {
        if patch.is_empty() {
            return self.items.contains(id);
        }
        let updated = self.items.update(id, patch);
        self.dirty |= updated;
        updated
    }
}

impl<G> RunSheetDocument<G> {
    pub fn meta(&self) -> &RunSheetMeta {
        &self.meta
    }

    pub fn items(&self) -> &OrderedItemList<G> {
        &self.items
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_status(&mut self, status: RunSheetStatus) {
        if self.meta.status != status {
            self.meta.status = status;
            self.dirty = true;
        }
    }

    pub fn total_duration(&self) -> u64 {
        self.items.total_duration()
    }

    pub fn snapshot(&self) -> RunSheetSnapshot {
        RunSheetSnapshot {
            meta: self.meta.clone(),
            items: self.items.items().to_vec(),
        }
    }

    /// Records a successful save at `saved_at`.
    pub fn mark_saved(&mut self, saved_at: DateTime<Utc>) {
        self.meta.updated_at = saved_at;
        self.dirty = false;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
