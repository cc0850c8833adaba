use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;
use crate::matches::MatchType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StreakType {
    W,
    L,
}

impl StreakType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakType::W => "W",
            StreakType::L => "L",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "W" => Some(StreakType::W),
            "L" => Some(StreakType::L),
            _ => None,
        }
    }
}

/// Running win/loss record stored on the user row and bumped on every
/// recorded match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerRecord {
    pub wins: i32,
    pub losses: i32,
    pub current_streak: i32,
    pub streak_type: Option<StreakType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub dupr_id: Option<String>,
    pub dupr_rating: Option<f64>,
    pub is_admin: bool,
    pub is_ghost: bool,
    pub email_verified: bool,
    pub dark_mode: bool,
    pub profile_picture_url: Option<String>,
    pub profile_picture_thumbnail_url: Option<String>,
    pub record: PlayerRecord,
    pub last_match_recorded_type: Option<MatchType>,
    pub created_at: DateTime<Utc>,
}

/// Compact user reference embedded in lists, leaderboards and match views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub dupr_rating: Option<f64>,
    pub is_ghost: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
}

impl FriendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendStatus::Pending => "pending",
            FriendStatus::Accepted => "accepted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(FriendStatus::Pending),
            "accepted" => Some(FriendStatus::Accepted),
            _ => None,
        }
    }
}

/// One side of a friendship edge as seen by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: FriendStatus,
    pub initiator: bool,
    pub created_at: DateTime<Utc>,
}

/// Relationship between the viewer and a profile owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipState {
    None,
    Friends,
    RequestSent,
    RequestReceived,
}
