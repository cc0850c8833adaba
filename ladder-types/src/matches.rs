use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::user::UserSummary;
use crate::{GroupId, MatchId, TeamId, TournamentId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Singles,
    Doubles,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Singles => "singles",
            MatchType::Doubles => "doubles",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "singles" => Some(MatchType::Singles),
            "doubles" => Some(MatchType::Doubles),
            _ => None,
        }
    }

    pub fn players_per_side(&self) -> usize {
        match self {
            MatchType::Singles => 1,
            MatchType::Doubles => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Team1 => "team1",
            Side::Team2 => "team2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "team1" => Some(Side::Team1),
            "team2" => Some(Side::Team2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Match {
    pub id: MatchId,
    pub match_type: MatchType,
    pub team1: Vec<UserId>,
    pub team2: Vec<UserId>,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner: Side,
    pub is_upset: bool,
    pub match_date: DateTime<Utc>,
    pub group_id: Option<GroupId>,
    pub tournament_id: Option<TournamentId>,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn players(&self, side: Side) -> &[UserId] {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn score(&self, side: Side) -> i32 {
        match side {
            Side::Team1 => self.team1_score,
            Side::Team2 => self.team2_score,
        }
    }

    pub fn team_id(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::Team1 => self.team1_id,
            Side::Team2 => self.team2_id,
        }
    }

    /// Which side the user played on, if any.
    pub fn side_of(&self, user_id: UserId) -> Option<Side> {
        if self.team1.contains(&user_id) {
            Some(Side::Team1)
        } else if self.team2.contains(&user_id) {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn involves(&self, user_id: UserId) -> bool {
        self.side_of(user_id).is_some()
    }

    pub fn is_draw(&self) -> bool {
        self.team1_score == self.team2_score
    }

    pub fn participants(&self) -> impl Iterator<Item = UserId> + '_ {
        self.team1.iter().chain(self.team2.iter()).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// A match enriched with player summaries for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchView {
    pub id: MatchId,
    pub match_type: MatchType,
    pub team1: Vec<UserSummary>,
    pub team2: Vec<UserSummary>,
    pub team1_name: String,
    pub team2_name: String,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner: Side,
    pub is_upset: bool,
    pub match_date: DateTime<Utc>,
    pub group_id: Option<GroupId>,
    pub tournament_id: Option<TournamentId>,
    pub tournament_name: Option<String>,
    pub viewer_outcome: Option<Outcome>,
}

/// Keyset cursor for paging through match history newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchCursor {
    pub match_date: DateTime<Utc>,
    pub id: MatchId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchPage {
    pub matches: Vec<MatchView>,
    /// Opaque token for the `before` parameter of the next request.
    pub next_cursor: Option<String>,
}
