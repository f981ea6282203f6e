//! Run sheets: the ordered run-of-show for a service.
//!
//! [`OrderedItemList`] is the editing core. It owns the items in display order,
//! hands out fresh ids through an [`IdGenerator`], and derives the total
//! duration from whatever the list holds at the moment it is asked. Nothing in
//! here performs I/O; [`RunSheetStore`] is the seam a host uses to persist a
//! [`RunSheetSnapshot`] when the user asks to save.

mod document;
mod error;
mod ids;
mod item;
mod list;
mod store;
mod template;

pub use document::{NewRunSheet, RunSheetDocument, RunSheetMeta, RunSheetSnapshot, RunSheetSummary};
pub use error::RunSheetError;
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use item::{ItemId, ItemPatch, ItemTemplate, RunSheetItem};
pub use list::{OrderedItemList, TimelineEntry};
pub use store::RunSheetStore;
pub use template::RunSheetTemplate;
