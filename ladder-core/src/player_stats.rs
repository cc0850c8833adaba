use ladder_types::{
    HeadToHead, Match, MatchType, OnboardingProgress, Outcome, PlayerRecord, StreakType, UserId,
    UserStats,
};
use std::collections::HashSet;

use crate::newest_first;

pub const RECENT_OPPONENTS_LIMIT: usize = 4;

/// Result of `match` from the point of view of `user_id`, or `None` when
/// the user did not play.
pub fn outcome_for(m: &Match, user_id: UserId) -> Option<Outcome> {
    let side = m.side_of(user_id)?;
    let own = m.score(side);
    let other = m.score(side.opposite());
    Some(if own > other {
        Outcome::Win
    } else if own < other {
        Outcome::Loss
    } else {
        Outcome::Draw
    })
}

/// Aggregate a user's record over `matches`. Draws are not counted.
pub fn calculate_stats(matches: &[Match], user_id: UserId) -> UserStats {
    let ordered = newest_first(matches);
    let outcomes: Vec<Outcome> = ordered
        .iter()
        .filter_map(|m| outcome_for(m, user_id))
        .filter(|o| *o != Outcome::Draw)
        .collect();

    let wins = outcomes.iter().filter(|o| **o == Outcome::Win).count() as u32;
    let losses = outcomes.len() as u32 - wins;
    let total_games = wins + losses;
    let win_rate = if total_games > 0 {
        wins as f64 / total_games as f64 * 100.0
    } else {
        0.0
    };

    let (current_streak, streak_type) = match outcomes.first() {
        None => (0, None),
        Some(first) => {
            let run = outcomes.iter().take_while(|o| *o == first).count() as u32;
            let kind = if *first == Outcome::Win {
                StreakType::W
            } else {
                StreakType::L
            };
            (run, Some(kind))
        }
    };

    UserStats {
        wins,
        losses,
        total_games,
        win_rate,
        current_streak,
        streak_type,
    }
}

/// Consecutive wins counting back from the newest match. Draws are
/// skipped and the first loss ends the run.
pub fn current_win_streak(matches: &[Match], user_id: UserId) -> u32 {
    let mut streak = 0;
    for m in newest_first(matches) {
        match outcome_for(m, user_id) {
            Some(Outcome::Win) => streak += 1,
            Some(Outcome::Loss) => break,
            Some(Outcome::Draw) | None => continue,
        }
    }
    streak
}

/// Distinct singles opponents, most recent first.
pub fn recent_opponents(matches: &[Match], user_id: UserId, limit: usize) -> Vec<UserId> {
    let mut seen = HashSet::new();
    let mut opponents = Vec::new();
    for m in newest_first(matches) {
        if m.match_type != MatchType::Singles {
            continue;
        }
        let Some(side) = m.side_of(user_id) else {
            continue;
        };
        for opponent in m.players(side.opposite()) {
            if seen.insert(*opponent) {
                opponents.push(*opponent);
            }
        }
        if opponents.len() >= limit {
            break;
        }
    }
    opponents.truncate(limit);
    opponents
}

/// Record of `a` against `b` over matches where they stood on opposite
/// sides.
pub fn head_to_head(matches: &[Match], a: UserId, b: UserId) -> Option<HeadToHead> {
    let mut record = HeadToHead::default();
    for m in matches {
        let (Some(side_a), Some(side_b)) = (m.side_of(a), m.side_of(b)) else {
            continue;
        };
        if side_a == side_b {
            continue;
        }
        let own = m.score(side_a);
        let other = m.score(side_b);
        if own == other {
            continue;
        }
        if own > other {
            record.wins += 1;
        } else {
            record.losses += 1;
        }
        record.point_diff += own - other;
    }

    if record.wins + record.losses == 0 {
        None
    } else {
        Some(record)
    }
}

/// Update of the denormalized per-user record written when a match is
/// recorded.
pub trait RunningStats {
    fn apply(&mut self, won: bool);
}

impl RunningStats for PlayerRecord {
    fn apply(&mut self, won: bool) {
        let result = if won { StreakType::W } else { StreakType::L };
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        if self.streak_type == Some(result) {
            self.current_streak += 1;
        } else {
            self.current_streak = 1;
            self.streak_type = Some(result);
        }
    }
}

pub fn onboarding_progress(
    has_avatar: bool,
    has_dupr: bool,
    has_group: bool,
    has_match: bool,
    has_friend: bool,
) -> OnboardingProgress {
    let steps = [has_avatar, has_dupr, has_group, has_match, has_friend];
    let done = steps.iter().filter(|s| **s).count() as u32;
    OnboardingProgress {
        has_avatar,
        has_dupr,
        has_group,
        has_match,
        has_friend,
        percent: done * 100 / steps.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ladder_types::Side;
    use uuid::Uuid;

    fn singles(a: UserId, b: UserId, sa: i32, sb: i32, day: i64) -> Match {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(day);
        Match {
            id: Uuid::new_v4(),
            match_type: MatchType::Singles,
            team1: vec![a],
            team2: vec![b],
            team1_id: None,
            team2_id: None,
            team1_score: sa,
            team2_score: sb,
            winner: if sa > sb { Side::Team1 } else { Side::Team2 },
            is_upset: false,
            match_date: date,
            group_id: None,
            tournament_id: None,
            recorded_by: a,
            created_at: date,
        }
    }

    #[test]
    fn test_stats_with_no_matches() {
        let stats = calculate_stats(&[], Uuid::new_v4());
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.streak_type, None);
    }

    #[test]
    fn test_stats_streak_uses_newest_result() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let matches = vec![
            singles(a, b, 11, 5, 0),
            singles(a, b, 5, 11, 1),
            singles(a, b, 4, 11, 2),
        ];
        let stats = calculate_stats(&matches, a);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.streak_type, Some(StreakType::L));
        assert!((stats.win_rate - 33.333).abs() < 0.01);

        let other = calculate_stats(&matches, b);
        assert_eq!(other.current_streak, 2);
        assert_eq!(other.streak_type, Some(StreakType::W));
    }

    #[test]
    fn test_current_win_streak_skips_draws() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let matches = vec![
            singles(a, b, 3, 11, 0),
            singles(a, b, 11, 3, 1),
            singles(a, b, 11, 11, 2),
            singles(a, b, 11, 9, 3),
        ];
        assert_eq!(current_win_streak(&matches, a), 2);
        assert_eq!(current_win_streak(&matches, b), 0);
    }

    #[test]
    fn test_recent_opponents_are_distinct_and_limited() {
        let me = Uuid::new_v4();
        let others: Vec<UserId> = (0..6).map(|_| Uuid::new_v4()).collect();
        let mut matches: Vec<Match> = others
            .iter()
            .enumerate()
            .map(|(i, o)| singles(me, *o, 11, 2, i as i64))
            .collect();
        matches.push(singles(others[5], me, 11, 2, 10));

        let recent = recent_opponents(&matches, me, RECENT_OPPONENTS_LIMIT);
        assert_eq!(recent, vec![others[5], others[4], others[3], others[2]]);
    }

    #[test]
    fn test_head_to_head() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let matches = vec![
            singles(a, b, 11, 5, 0),
            singles(b, a, 11, 9, 1),
            singles(a, c, 11, 0, 2),
        ];
        let h2h = head_to_head(&matches, a, b).unwrap();
        assert_eq!(h2h.wins, 1);
        assert_eq!(h2h.losses, 1);
        assert_eq!(h2h.point_diff, 4);
        assert!(head_to_head(&matches, b, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_running_stats_streaks() {
        let mut record = PlayerRecord::default();
        record.apply(true);
        record.apply(true);
        assert_eq!(record.current_streak, 2);
        assert_eq!(record.streak_type, Some(StreakType::W));

        record.apply(false);
        assert_eq!(record.wins, 2);
        assert_eq!(record.losses, 1);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.streak_type, Some(StreakType::L));
    }

    #[test]
    fn test_onboarding_percent() {
        assert_eq!(onboarding_progress(false, false, false, false, false).percent, 0);
        assert_eq!(onboarding_progress(true, true, false, false, false).percent, 40);
        assert_eq!(onboarding_progress(true, true, true, true, true).percent, 100);
    }
}
