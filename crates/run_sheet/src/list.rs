use std::collections::{BTreeMap, HashSet};

use shared::domain::ItemKind;

use crate::{
    error::RunSheetError,
    ids::{IdGenerator, UuidIds},
    item::{ItemId, ItemPatch, ItemTemplate, RunSheetItem},
};

/// Ordered run sheet items with stable ids.
///
/// Order is array position and nothing else. `append` adds at the end,
/// `remove` closes the gap without reordering the rest, and `move_to` is the
/// only operation that changes relative order. Every operation that names an
/// id which is not in the list is a silent no-op.
#[derive(Debug, Clone)]
pub struct OrderedItemList<G = UuidIds> {
    items: Vec<RunSheetItem>,
    ids: G,
}

/// An item with its offset from the start of the service, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry<'a> {
    pub item: &'a RunSheetItem,
    pub start_minute: u64,
    pub end_minute: u64,
}

impl OrderedItemList<UuidIds> {
    pub fn new() -> Self {
        Self::with_ids(UuidIds)
    }
}

impl Default for OrderedItemList<UuidIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> OrderedItemList<G> {
    pub fn with_ids(ids: G) -> Self {
        Self {
            items: Vec::new(),
            ids,
        }
    }

    /// Rebuilds a list from persisted items, keeping their order and ids.
    pub fn from_items(items: Vec<RunSheetItem>, ids: G) -> Result<Self, RunSheetError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(RunSheetError::DuplicateItemId(item.id.0.clone()));
            }
        }
        Ok(Self { items, ids })
    }

    /// Creates an item from `template` under a fresh id and puts it last.
    ///
    /// Ids already present are skipped, so the generator only has to
    /// eventually produce an unused one.
    pub fn append(&mut self, template: ItemTemplate) -> &RunSheetItem {
        let id = loop {
            let candidate = self.ids.next_id();
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        self.items.push(RunSheetItem::from_template(id, template));
        &self.items[self.items.len() - 1]
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<RunSheetItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Moves the item to `new_index`, clamped to `[0, len - 1]`, shifting the
    /// items in between by one. Returns whether the order changed.
    pub fn move_to(&mut self, id: &ItemId, new_index: i64) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let last = self.items.len() - 1;
        let to = usize::try_from(new_index.max(0)).map_or(last, |index| index.min(last));

        if from < to {
            self.items[from..=to].rotate_left(1);
        } else if to < from {
            self.items[to..=from].rotate_right(1);
        } else {
            return false;
        }
        true
    }

    /// Merges `patch` into the matching item in place. Returns whether an item
    /// matched.
    pub fn update(&mut self, id: &ItemId, patch: ItemPatch) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn into_items(self) -> Vec<RunSheetItem> {
        self.items
    }
}

impl<G> OrderedItemList<G> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RunSheetItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunSheetItem> {
        self.items.iter()
    }

    pub fn get(&self, id: &ItemId) -> Option<&RunSheetItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Sum of every item's duration, recomputed on each call.
    pub fn total_duration(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.duration_minutes))
            .sum()
    }

    pub fn timeline(&self) -> Vec<TimelineEntry<'_>> {
        let mut offset = 0u64;
        self.items
            .iter()
            .map(|item| {
                let start_minute = offset;
                offset += u64::from(item.duration_minutes);
                TimelineEntry {
                    item,
                    start_minute,
                    end_minute: offset,
                }
            })
            .collect()
    }

    pub fn duration_by_kind(&self) -> BTreeMap<ItemKind, u64> {
        let mut totals = BTreeMap::new();
        for item in &self.items {
            *totals.entry(item.kind).or_insert(0) += u64::from(item.duration_minutes);
        }
        totals
    }
}

impl<'a, G> IntoIterator for &'a OrderedItemList<G> {
    type Item = &'a RunSheetItem;
    type IntoIter = std::slice::Iter<'a, RunSheetItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
