use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeId {
    Rookie,
    HotStreak,
    Century,
    Champion,
}

impl BadgeId {
    pub const ALL: [BadgeId; 4] = [
        BadgeId::Rookie,
        BadgeId::HotStreak,
        BadgeId::Century,
        BadgeId::Champion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::Rookie => "ROOKIE",
            BadgeId::HotStreak => "HOT_STREAK",
            BadgeId::Century => "CENTURY",
            BadgeId::Champion => "CHAMPION",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        BadgeId::ALL.into_iter().find(|badge| badge.as_str() == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub awarded_at: Option<DateTime<Utc>>,
}
