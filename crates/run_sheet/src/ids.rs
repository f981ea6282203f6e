use uuid::Uuid;

use crate::item::ItemId;

/// Source of fresh item ids. Any collision-free scheme works.
pub trait IdGenerator {
    fn next_id(&mut self) -> ItemId;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> ItemId {
        ItemId(Uuid::new_v4().to_string())
    }
}

/// Monotonic counter ids: "1", "2", ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next.to_string());
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> ItemId {
        (**self).next_id()
    }
}
