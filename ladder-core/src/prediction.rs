use ladder_types::{Match, MatchType, Outcome, Prediction, Side, UserId};
use std::collections::HashSet;

use crate::newest_first;
use crate::player_stats::{calculate_stats, head_to_head, outcome_for};

pub const H2H_WEIGHT: f64 = 0.5;
pub const FORM_WEIGHT: f64 = 0.3;
pub const GLOBAL_WEIGHT: f64 = 0.2;
pub const NEUTRAL_RATE: f64 = 50.0;
pub const FORM_WINDOW: usize = 5;

const HOT_STREAK_FORM: f64 = 80.0;
const DOMINANCE_RATE: f64 = 75.0;
const WEAK_DOMINANCE_RATE: f64 = 25.0;

/// Percentages (0..=100) feeding a matchup prediction. Unknown values are
/// `NEUTRAL_RATE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionInputs {
    pub h2h_win_rate: f64,
    pub team1_form: f64,
    pub team2_form: f64,
    pub team1_global: f64,
    pub team2_global: f64,
}

pub fn predict(inputs: &PredictionInputs) -> Prediction {
    let h2h_diff = (inputs.h2h_win_rate - 50.0) * 2.0;
    let form_diff = inputs.team1_form - inputs.team2_form;
    let global_diff = inputs.team1_global - inputs.team2_global;

    let score = h2h_diff * H2H_WEIGHT + form_diff * FORM_WEIGHT + global_diff * GLOBAL_WEIGHT;
    let team1 = (50.0 + score / 2.0).clamp(0.0, 100.0);
    let team2 = 100.0 - team1;

    let insight = if inputs.team1_form > HOT_STREAK_FORM || inputs.team2_form > HOT_STREAK_FORM {
        "Team is on a hot streak!"
    } else if inputs.h2h_win_rate > DOMINANCE_RATE || inputs.h2h_win_rate < WEAK_DOMINANCE_RATE {
        "Historical dominance."
    } else {
        "A closely matched game."
    };

    Prediction {
        team1_probability: team1.round_ties_even() as u32,
        team2_probability: team2.round_ties_even() as u32,
        insight: insight.to_string(),
    }
}

/// Team 1's win rate against team 2. Singles use the players' head to
/// head; doubles only count meetings between the exact same pairs.
pub fn h2h_win_rate(matches: &[Match], team1: &[UserId], team2: &[UserId]) -> f64 {
    if let ([a], [b]) = (team1, team2) {
        return match head_to_head(matches, *a, *b) {
            Some(h2h) => h2h.wins as f64 / (h2h.wins + h2h.losses) as f64 * 100.0,
            None => NEUTRAL_RATE,
        };
    }

    let t1: HashSet<UserId> = team1.iter().copied().collect();
    let t2: HashSet<UserId> = team2.iter().copied().collect();
    let mut wins = 0u32;
    let mut total = 0u32;
    for m in matches.iter().filter(|m| m.match_type == MatchType::Doubles) {
        let m1: HashSet<UserId> = m.team1.iter().copied().collect();
        let m2: HashSet<UserId> = m.team2.iter().copied().collect();
        let ours = if m1 == t1 && m2 == t2 {
            Side::Team1
        } else if m1 == t2 && m2 == t1 {
            Side::Team2
        } else {
            continue;
        };
        total += 1;
        if m.winner == ours {
            wins += 1;
        }
    }

    if total == 0 {
        NEUTRAL_RATE
    } else {
        wins as f64 / total as f64 * 100.0
    }
}

/// Share of wins over the player's last few matches.
pub fn player_form(matches: &[Match], user_id: UserId) -> f64 {
    let recent: Vec<Outcome> = newest_first(matches)
        .into_iter()
        .filter_map(|m| outcome_for(m, user_id))
        .take(FORM_WINDOW)
        .collect();
    if recent.is_empty() {
        return NEUTRAL_RATE;
    }
    let wins = recent.iter().filter(|o| **o == Outcome::Win).count();
    wins as f64 / recent.len() as f64 * 100.0
}

pub fn player_global(matches: &[Match], user_id: UserId) -> f64 {
    let stats = calculate_stats(matches, user_id);
    if stats.total_games == 0 {
        NEUTRAL_RATE
    } else {
        stats.win_rate
    }
}

fn team_average(team: &[UserId], per_player: impl Fn(UserId) -> f64) -> f64 {
    if team.is_empty() {
        return NEUTRAL_RATE;
    }
    team.iter().map(|id| per_player(*id)).sum::<f64>() / team.len() as f64
}

/// Predict a matchup from the full match history of everyone involved.
pub fn predict_matchup(matches: &[Match], team1: &[UserId], team2: &[UserId]) -> Prediction {
    let inputs = PredictionInputs {
        h2h_win_rate: h2h_win_rate(matches, team1, team2),
        team1_form: team_average(team1, |id| player_form(matches, id)),
        team2_form: team_average(team2, |id| player_form(matches, id)),
        team1_global: team_average(team1, |id| player_global(matches, id)),
        team2_global: team_average(team2, |id| player_global(matches, id)),
    };
    predict(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn neutral() -> PredictionInputs {
        PredictionInputs {
            h2h_win_rate: 50.0,
            team1_form: 50.0,
            team2_form: 50.0,
            team1_global: 50.0,
            team2_global: 50.0,
        }
    }

    #[test]
    fn test_neutral_prediction() {
        let prediction = predict(&neutral());
        assert_eq!(prediction.team1_probability, 50);
        assert_eq!(prediction.team2_probability, 50);
        assert_eq!(prediction.insight, "A closely matched game.");
    }

    #[test]
    fn test_weighted_prediction() {
        let inputs = PredictionInputs {
            h2h_win_rate: 100.0,
            team1_form: 60.0,
            team2_form: 40.0,
            team1_global: 70.0,
            team2_global: 50.0,
        };
        // (100 * 0.5 + 20 * 0.3 + 20 * 0.2) / 2 = 30
        let prediction = predict(&inputs);
        assert_eq!(prediction.team1_probability, 80);
        assert_eq!(prediction.team2_probability, 20);
        assert_eq!(prediction.insight, "Historical dominance.");
    }

    #[test]
    fn test_hot_streak_insight_wins_over_dominance() {
        let inputs = PredictionInputs {
            h2h_win_rate: 0.0,
            team2_form: 100.0,
            ..neutral()
        };
        let prediction = predict(&inputs);
        assert_eq!(prediction.insight, "Team is on a hot streak!");
        assert!(prediction.team1_probability < 50);
        assert_eq!(prediction.team1_probability + prediction.team2_probability, 100);
    }

    #[test]
    fn test_probability_is_clamped() {
        let inputs = PredictionInputs {
            h2h_win_rate: 100.0,
            team1_form: 100.0,
            team2_form: 0.0,
            team1_global: 100.0,
            team2_global: 0.0,
        };
        let prediction = predict(&inputs);
        assert_eq!(prediction.team1_probability, 100);
        assert_eq!(prediction.team2_probability, 0);
    }

    #[test]
    fn test_predict_matchup_from_history() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 18, 0, 0).unwrap();
        let matches: Vec<Match> = (0..4)
            .map(|i| {
                let date = start + Duration::days(i);
                Match {
                    id: Uuid::new_v4(),
                    match_type: MatchType::Singles,
                    team1: vec![a],
                    team2: vec![b],
                    team1_id: None,
                    team2_id: None,
                    team1_score: 11,
                    team2_score: 6,
                    winner: Side::Team1,
                    is_upset: false,
                    match_date: date,
                    group_id: None,
                    tournament_id: None,
                    recorded_by: a,
                    created_at: date,
                }
            })
            .collect();

        assert_eq!(h2h_win_rate(&matches, &[a], &[b]), 100.0);
        assert_eq!(player_form(&matches, b), 0.0);
        assert_eq!(player_form(&[], b), NEUTRAL_RATE);

        let prediction = predict_matchup(&matches, &[a], &[b]);
        assert_eq!(prediction.team1_probability, 100);
    }

    #[test]
    fn test_doubles_h2h_requires_same_pairs() {
        let ids: Vec<UserId> = (0..4).map(|_| Uuid::new_v4()).collect();
        assert_eq!(h2h_win_rate(&[], &ids[..2], &ids[2..]), NEUTRAL_RATE);
    }
}
