use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::user::UserSummary;
use crate::{TeamId, UserId};

pub const DEFAULT_TEAM_ELO: f64 = 1200.0;

/// A persistent doubles pairing. Members are stored in sorted order so a
/// pair of players always resolves to the same team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Team {
    pub id: TeamId,
    pub player_a: UserId,
    pub player_b: UserId,
    pub name: String,
    pub wins: i32,
    pub losses: i32,
    pub elo: f64,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn members(&self) -> [UserId; 2] {
        [self.player_a, self.player_b]
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.player_a == user_id || self.player_b == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub name: String,
    pub members: Vec<UserSummary>,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    pub win_percentage: f64,
}
