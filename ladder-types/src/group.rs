use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GroupId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner_id: UserId,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lightweight group listing entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupCard {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub member_count: u32,
}

/// Delivery state of an emailed group invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Sending,
    Sent,
    Failed,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Sending => "sending",
            InviteStatus::Sent => "sent",
            InviteStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sending" => Some(InviteStatus::Sending),
            "sent" => Some(InviteStatus::Sent),
            "failed" => Some(InviteStatus::Failed),
            _ => None,
        }
    }
}

/// An emailed invite. `id` is the hash of the token sent to the invitee;
/// the raw token is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupInvite {
    pub id: String,
    pub group_id: GroupId,
    pub email: String,
    pub name: Option<String>,
    pub inviter_id: UserId,
    pub used: bool,
    pub status: InviteStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}
