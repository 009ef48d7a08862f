//! Content categories exposed by the upstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the independently fetched content lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Classes currently streaming.
    #[serde(rename = "live")]
    Live,
    /// Scheduled classes.
    #[serde(rename = "up")]
    Upcoming,
    /// Recorded classes.
    #[serde(rename = "completed")]
    Completed,
    /// Announcements.
    #[serde(rename = "notifications")]
    Notifications,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [
        Self::Live,
        Self::Upcoming,
        Self::Completed,
        Self::Notifications,
    ];

    /// Name used in the upstream request body and in served JSON.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Upcoming => "up",
            Self::Completed => "completed",
            Self::Notifications => "notifications",
        }
    }

    /// Human-readable section title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Upcoming => "Upcoming",
            Self::Completed => "Recorded",
            Self::Notifications => "Notifications",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "up" | "upcoming" => Ok(Self::Upcoming),
            "completed" | "recorded" => Ok(Self::Completed),
            "notifications" => Ok(Self::Notifications),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}
