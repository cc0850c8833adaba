use chrono::{DateTime, Duration, TimeZone, Utc};
use ladder_core::winner_of;
use ladder_types::{Match, MatchType, UserId, UserSummary};
use uuid::Uuid;

/// Monday of the first test week, noon UTC
pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
}

pub fn create_test_member(name: &str) -> UserSummary {
    UserSummary {
        id: Uuid::new_v4(),
        username: name.to_lowercase(),
        display_name: name.to_string(),
        avatar_url: None,
        dupr_rating: None,
        is_ghost: false,
    }
}

/// Creates a completed match played `days` after the season start
pub fn create_match(team1: &[UserId], team2: &[UserId], scores: (i32, i32), days: i64) -> Match {
    let date = season_start() + Duration::days(days);
    Match {
        id: Uuid::new_v4(),
        match_type: if team1.len() == 2 {
            MatchType::Doubles
        } else {
            MatchType::Singles
        },
        team1: team1.to_vec(),
        team2: team2.to_vec(),
        team1_id: None,
        team2_id: None,
        team1_score: scores.0,
        team2_score: scores.1,
        winner: winner_of(scores.0, scores.1),
        is_upset: false,
        match_date: date,
        group_id: None,
        tournament_id: None,
        recorded_by: team1[0],
        created_at: date,
    }
}

pub fn create_singles(a: &UserSummary, b: &UserSummary, scores: (i32, i32), days: i64) -> Match {
    create_match(&[a.id], &[b.id], scores, days)
}
