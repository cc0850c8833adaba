use chrono::{DateTime, Utc};
use ladder_types::{Badge, BadgeId, StreakType, UserStats};

use crate::leaderboard::HOT_STREAK_THRESHOLD;

pub const CENTURY_CLUB_THRESHOLD: u32 = 100;

pub struct BadgeDefinition {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub fn definition(id: BadgeId) -> BadgeDefinition {
    match id {
        BadgeId::Rookie => BadgeDefinition {
            name: "Rookie",
            icon: "👶",
            description: "Played your first match",
        },
        BadgeId::HotStreak => BadgeDefinition {
            name: "On Fire",
            icon: "🔥",
            description: "Won 3 matches in a row",
        },
        BadgeId::Century => BadgeDefinition {
            name: "Century Club",
            icon: "💯",
            description: "Played 100 matches",
        },
        BadgeId::Champion => BadgeDefinition {
            name: "Tournament Champ",
            icon: "🏆",
            description: "Won a tournament",
        },
    }
}

pub fn badge(id: BadgeId, awarded_at: Option<DateTime<Utc>>) -> Badge {
    let def = definition(id);
    Badge {
        id,
        name: def.name.to_string(),
        icon: def.icon.to_string(),
        description: def.description.to_string(),
        awarded_at,
    }
}

/// Badges earned by the match that produced `stats`. Thresholds are exact
/// so each badge is considered once, on the match that reaches it.
pub fn evaluate_post_match(stats: &UserStats) -> Vec<BadgeId> {
    let mut earned = Vec::new();
    if stats.total_games == 1 {
        earned.push(BadgeId::Rookie);
    }
    if stats.total_games == CENTURY_CLUB_THRESHOLD {
        earned.push(BadgeId::Century);
    }
    if stats.current_streak == HOT_STREAK_THRESHOLD && stats.streak_type == Some(StreakType::W) {
        earned.push(BadgeId::HotStreak);
    }
    earned
}
