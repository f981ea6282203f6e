use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{domain::ItemKind, error::ParseEnumError};

use crate::{ids::IdGenerator, item::ItemTemplate, list::OrderedItemList};

/// Starting points offered when a run sheet is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunSheetTemplate {
    #[default]
    Blank,
    SundayMorning,
    PrayerMeeting,
    YouthService,
}

impl RunSheetTemplate {
    pub const ALL: &'static [RunSheetTemplate] = &[
        RunSheetTemplate::Blank,
        RunSheetTemplate::SundayMorning,
        RunSheetTemplate::PrayerMeeting,
        RunSheetTemplate::YouthService,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunSheetTemplate::Blank => "blank",
            RunSheetTemplate::SundayMorning => "sunday-morning",
            RunSheetTemplate::PrayerMeeting => "prayer-meeting",
            RunSheetTemplate::YouthService => "youth-service",
        }
    }

    /// A fresh list holding this template's items, ids drawn from `ids`.
    pub fn seed<G: IdGenerator>(self, ids: G) -> OrderedItemList<G> {
        let mut list = OrderedItemList::with_ids(ids);
        for item in self.items() {
            list.append(item);
        }
        list
    }

    pub fn items(self) -> Vec<ItemTemplate> {
        match self {
            RunSheetTemplate::Blank => Vec::new(),
            RunSheetTemplate::SundayMorning => vec![
                ItemTemplate::new(ItemKind::Worship, "Welcome & Opening Prayer", 5)
                    .notes("Welcome everyone, brief announcements")
                    .cues(["Lights up", "Mic check"]),
                ItemTemplate::new(ItemKind::Worship, "Worship Set 1", 20)
                    .media(["worship-slides-1.pptx", "background-video.mp4"])
                    .cues(["Start background video", "Slides ready"]),
                ItemTemplate::new(ItemKind::Announcement, "Church Announcements", 5)
                    .media(["announcements-slides.pptx"])
                    .cues(["Switch to announcement slides"]),
                ItemTemplate::new(ItemKind::Sermon, "Main Message", 30)
                    .media(["sermon-slides.pptx"])
                    .cues(["Sermon slides ready", "Lower lights"]),
                ItemTemplate::new(ItemKind::Worship, "Closing Worship", 15)
                    .media(["closing-worship-slides.pptx"])
                    .cues(["Lights up", "Final slides"]),
                ItemTemplate::new(ItemKind::Prayer, "Closing Prayer & Benediction", 5)
                    .cues(["Soft background music"]),
            ],
            RunSheetTemplate::PrayerMeeting => vec![
                ItemTemplate::new(ItemKind::Worship, "Opening Song", 10),
                ItemTemplate::new(ItemKind::Sermon, "Devotional", 15),
                ItemTemplate::new(ItemKind::Prayer, "Group Prayer", 45)
                    .cues(["Soft background music"]),
                ItemTemplate::new(ItemKind::Prayer, "Closing Prayer", 5),
            ],
            RunSheetTemplate::YouthService => vec![
                ItemTemplate::new(ItemKind::Media, "Countdown Video", 5)
                    .cues(["Start countdown", "House lights down"]),
                ItemTemplate::new(ItemKind::Worship, "Worship Set", 20),
                ItemTemplate::new(ItemKind::Transition, "Games & Mixer", 15),
                ItemTemplate::new(ItemKind::Sermon, "Youth Message", 25),
                ItemTemplate::new(ItemKind::Prayer, "Response & Prayer", 10),
            ],
        }
    }
}

impl FromStr for RunSheetTemplate {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|template| template.as_str() == value)
            .ok_or_else(|| ParseEnumError::new("RunSheetTemplate", value))
    }
}

impl fmt::Display for RunSheetTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
