use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ServiceId);
id_newtype!(AssignmentId);
id_newtype!(RunSheetId);
id_newtype!(MediaFileId);
id_newtype!(AnnouncementId);
id_newtype!(ApplicationId);
id_newtype!(NotificationId);

/// Closed string enums whose text form is shared by serde, storage columns and
/// CLI arguments.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new(stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

string_enum!(ItemKind {
    Worship => "worship",
    Sermon => "sermon",
    Announcement => "announcement",
    Prayer => "prayer",
    Media => "media",
    Transition => "transition",
});

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Announcement
    }
}

string_enum!(RunSheetStatus {
    Draft => "draft",
    Review => "review",
    Approved => "approved",
    Archived => "archived",
});

string_enum!(RunSheetCategory {
    SundayService => "sunday-service",
    PrayerMeeting => "prayer-meeting",
    YouthService => "youth-service",
    SpecialEvent => "special-event",
});

string_enum!(UserRole {
    Admin => "admin",
    MediaLead => "media_lead",
    Volunteer => "volunteer",
});

impl UserRole {
    /// Admins and media leads may manage sheets, schedules and reviews.
    pub fn is_lead(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::MediaLead)
    }
}

string_enum!(ServiceStatus {
    Scheduled => "scheduled",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

string_enum!(AssignmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Declined => "declined",
});

string_enum!(AnnouncementPriority {
    Low => "low",
    Normal => "normal",
    High => "high",
    Urgent => "urgent",
});

string_enum!(ApplicationStatus {
    Pending => "pending",
    UnderReview => "under_review",
    Approved => "approved",
    Rejected => "rejected",
});

/// A list filter value that is either a concrete variant or "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }

    pub fn matches_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Choice::All, _) => true,
            (Choice::Only(wanted), Some(value)) => wanted == value,
            (Choice::Only(_), None) => false,
        }
    }
}

impl<T: FromStr<Err = ParseEnumError>> FromStr for Choice<T> {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("all") {
            Ok(Choice::All)
        } else {
            value.parse().map(Choice::Only)
        }
    }
}

/// Case-insensitive substring match used by every catalog search box.
pub fn matches_search(needle: &str, haystacks: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .iter()
        .any(|hay| hay.to_lowercase().contains(&needle))
}
