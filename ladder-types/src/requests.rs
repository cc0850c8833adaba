use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::announcement::AnnouncementLevel;
use crate::matches::MatchType;
use crate::{GroupId, TournamentId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub name: Option<String>,
    /// Falls back to the email carried by the identity token.
    pub email: Option<String>,
    pub dupr_rating: Option<f64>,
    /// Referral token from a friend invite link.
    pub invite_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub dupr_id: Option<String>,
    pub dupr_rating: Option<f64>,
    pub dark_mode: Option<bool>,
    pub profile_picture_url: Option<String>,
    pub profile_picture_thumbnail_url: Option<String>,
}

/// A match as entered by a user. `player1` defaults to the submitter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchSubmission {
    pub match_type: MatchType,
    pub player1: Option<UserId>,
    pub partner: Option<UserId>,
    pub player2: UserId,
    pub opponent2: Option<UserId>,
    pub player1_score: i32,
    pub player2_score: i32,
    pub match_date: Option<NaiveDate>,
    pub group_id: Option<GroupId>,
    pub tournament_id: Option<TournamentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InviteFriendRequest {
    pub friend_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InviteEmailRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateTournamentRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub match_type: Option<MatchType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvitePlayerRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InviteGroupRequest {
    pub group_id: GroupId,
}

/// Name a participant plays under in a doubles tournament.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamNameRequest {
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RenameTeamRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnnouncementRequest {
    pub text: String,
    #[serde(default)]
    pub level: AnnouncementLevel,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MergeRequest {
    pub source_id: UserId,
    pub target_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FriendInviteLink {
    pub token: String,
    pub url: String,
}
