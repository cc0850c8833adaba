use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::user::{StreakType, UserSummary};
use crate::{GroupId, MatchId, UserId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub wins: u32,
    pub losses: u32,
    pub total_games: u32,
    pub win_rate: f64,
    pub current_streak: u32,
    /// `None` when the user has no decided games.
    pub streak_type: Option<StreakType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FormResult {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RankChange {
    Moved(i32),
    New,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub user: UserSummary,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub total_score: i64,
    pub avg_score: f64,
    pub win_rate: f64,
    pub form: Vec<FormResult>,
    pub rank_change: RankChange,
    pub streak: u32,
    pub is_on_fire: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GlobalLeaderboardEntry {
    pub user: UserSummary,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub win_percentage: f64,
}

/// Where a user sits on one of their groups' leaderboards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupRanking {
    pub group_id: GroupId,
    pub group_name: String,
    pub rank: Option<u32>,
    pub points: f64,
    pub form: Vec<FormResult>,
    pub player_above: Option<String>,
    pub points_to_overtake: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,
    pub point_diff: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartnershipRecord {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RivalryStats {
    pub wins: u32,
    pub losses: u32,
    pub point_diff: i32,
    pub avg_points_scored: f64,
    pub avg_points_conceded: f64,
    pub partnership: PartnershipRecord,
    pub match_ids: Vec<MatchId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupUserStats {
    pub rank: Option<u32>,
    pub wins: u32,
    pub losses: u32,
    pub win_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Prediction {
    pub team1_probability: u32,
    pub team2_probability: u32,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendDataset {
    pub user_id: UserId,
    pub label: String,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendData {
    pub labels: Vec<String>,
    pub datasets: Vec<TrendDataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OnboardingProgress {
    pub has_avatar: bool,
    pub has_dupr: bool,
    pub has_group: bool,
    pub has_match: bool,
    pub has_friend: bool,
    pub percent: u32,
}
