use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use shared::domain::ItemKind;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One segment of a service's run-of-show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSheetItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assigned_to: String,
    /// Opaque references into the media catalog. Informational only.
    #[serde(default)]
    pub media_refs: BTreeSet<String>,
    /// Production cues in the order they are called.
    #[serde(default)]
    pub cues: Vec<String>,
}

impl RunSheetItem {
    pub fn from_template(id: ItemId, template: ItemTemplate) -> Self {
        Self {
            id,
            kind: template.kind,
            title: template.title,
            duration_minutes: template.duration_minutes,
            notes: template.notes,
            assigned_to: template.assigned_to,
            media_refs: template.media_refs,
            cues: template.cues,
        }
    }

    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.duration_minutes = duration_minutes;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(media_refs) = patch.media_refs {
            self.media_refs = media_refs;
        }
        if let Some(cues) = patch.cues {
            self.cues = cues;
        }
    }
}

/// Field values for a new item. The default is what "Add Item" creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub kind: ItemKind,
    pub title: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub media_refs: BTreeSet<String>,
    #[serde(default)]
    pub cues: Vec<String>,
}

impl Default for ItemTemplate {
    fn default() -> Self {
        Self {
            kind: ItemKind::Announcement,
            title: "New Item".to_string(),
            duration_minutes: 5,
            notes: String::new(),
            assigned_to: String::new(),
            media_refs: BTreeSet::new(),
            cues: Vec::new(),
        }
    }
}

impl ItemTemplate {
    pub fn new(kind: ItemKind, title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            kind,
            title: title.into(),
            duration_minutes,
            ..Self::default()
        }
    }

    pub fn with_duration(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn assigned_to(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = assigned_to.into();
        self
    }

    pub fn media<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_refs.extend(refs.into_iter().map(Into::into));
        self
    }

    pub fn cues<I, S>(mut self, cues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cues.extend(cues.into_iter().map(Into::into));
        self
    }
}

/// Partial update merged into an existing item; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_refs: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cues: Option<Vec<String>>,
}

impl ItemPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn duration(duration_minutes: u32) -> Self {
        Self {
            duration_minutes: Some(duration_minutes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
