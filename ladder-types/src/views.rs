//! Composite response bodies assembled by the server for whole pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::announcement::Announcement;
use crate::badge::Badge;
use crate::group::{Group, GroupCard, GroupInvite};
use crate::matches::MatchView;
use crate::stats::{
    GlobalLeaderboardEntry, GroupRanking, HeadToHead, LeaderboardEntry, OnboardingProgress,
    RivalryStats, UserStats,
};
use crate::team::{Team, TeamStanding};
use crate::tournament::{ParticipantView, Standing, Tournament};
use crate::user::{FriendshipState, User, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PastTournament {
    pub tournament: Tournament,
    pub winner_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub user: User,
    pub stats: UserStats,
    pub matches: Vec<MatchView>,
    pub recent_opponents: Vec<UserSummary>,
    pub friends: Vec<UserSummary>,
    pub requests: Vec<UserSummary>,
    pub group_rankings: Vec<GroupRanking>,
    pub tournament_invites: Vec<Tournament>,
    pub active_tournaments: Vec<Tournament>,
    pub past_tournaments: Vec<PastTournament>,
    pub badges: Vec<Badge>,
    pub onboarding: OnboardingProgress,
    /// Present only while an admin has the banner switched on.
    pub announcement: Option<Announcement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Profile {
    pub user: UserSummary,
    pub friendship: FriendshipState,
    pub stats: UserStats,
    pub head_to_head: Option<HeadToHead>,
    pub friends: Vec<UserSummary>,
    pub matches: Vec<MatchView>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Community {
    pub friends: Vec<UserSummary>,
    pub incoming_requests: Vec<UserSummary>,
    pub outgoing_requests: Vec<UserSummary>,
    pub all_users: Vec<UserSummary>,
    pub public_groups: Vec<GroupCard>,
    pub tournament_invites: Vec<Tournament>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupDetails {
    pub group: Group,
    pub owner: Option<UserSummary>,
    pub members: Vec<UserSummary>,
    pub is_member: bool,
    pub is_owner: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub team_leaderboard: Vec<TeamStanding>,
    pub best_buds: Option<TeamStanding>,
    pub recent_matches: Vec<MatchView>,
    pub giant_slayer: Option<MatchView>,
    pub eligible_friends: Vec<UserSummary>,
    pub pending_invites: Vec<GroupInvite>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupRivalry {
    pub player_a: UserSummary,
    pub player_b: UserSummary,
    pub stats: RivalryStats,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TournamentDetails {
    pub tournament: Tournament,
    pub organizer: Option<UserSummary>,
    pub participants: Vec<ParticipantView>,
    pub standings: Vec<Standing>,
    pub podium: Vec<Standing>,
    pub invitable_users: Vec<UserSummary>,
    pub user_groups: Vec<GroupCard>,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamDetails {
    pub team: Team,
    pub members: Vec<UserSummary>,
    pub recent_matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_tournaments: u64,
    pub recent_matches: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GraphNode {
    pub id: uuid::Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GraphEdge {
    pub from: uuid::Uuid,
    pub to: uuid::Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FriendGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Site-wide board plus the most recent results.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GlobalLeaderboard {
    pub players: Vec<GlobalLeaderboardEntry>,
    pub latest_matches: Vec<MatchView>,
}
