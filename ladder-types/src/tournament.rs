use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::matches::MatchType;
use crate::user::UserSummary;
use crate::{TournamentId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TournamentStatus {
    Active,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Active => "Active",
            TournamentStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(TournamentStatus::Active),
            "Completed" => Some(TournamentStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    Accepted,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Accepted => "accepted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ParticipantStatus::Pending),
            "accepted" => Some(ParticipantStatus::Accepted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub match_type: MatchType,
    pub status: TournamentStatus,
    pub organizer_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    pub user_id: UserId,
    pub status: ParticipantStatus,
    pub team_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantView {
    pub user: UserSummary,
    pub status: ParticipantStatus,
    pub team_name: Option<String>,
}

/// A row of the tournament table. `id` is a player id for singles and a
/// team id for doubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Standing {
    pub id: uuid::Uuid,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub point_diff: i32,
}
