use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementLevel {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl AnnouncementLevel {
    pub const ALL: [AnnouncementLevel; 4] = [
        AnnouncementLevel::Info,
        AnnouncementLevel::Success,
        AnnouncementLevel::Warning,
        AnnouncementLevel::Danger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementLevel::Info => "info",
            AnnouncementLevel::Success => "success",
            AnnouncementLevel::Warning => "warning",
            AnnouncementLevel::Danger => "danger",
        }
    }

    /// Unknown stored values read as `Info`.
    pub fn parse(value: &str) -> Self {
        AnnouncementLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == value)
            .unwrap_or_default()
    }
}

/// Site-wide banner set by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Announcement {
    pub text: String,
    pub level: AnnouncementLevel,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}
