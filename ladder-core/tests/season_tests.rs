mod common;

use chrono::Duration;
use common::*;
use ladder_core::*;
use ladder_types::{FormResult, RankChange, StreakType};
use std::collections::HashMap;

#[test]
fn test_group_season_leaderboard() {
    let alice = create_test_member("Alice");
    let bob = create_test_member("Bob");
    let carol = create_test_member("Carol");
    let members = vec![alice.clone(), bob.clone(), carol.clone()];

    let matches = vec![
        create_singles(&alice, &bob, (11, 4), 0),
        create_singles(&alice, &carol, (11, 8), 1),
        create_singles(&bob, &carol, (11, 9), 2),
        create_singles(&carol, &alice, (13, 11), 10),
        create_singles(&carol, &bob, (11, 2), 11),
        create_singles(&carol, &alice, (11, 6), 12),
    ];
    let now = season_start() + Duration::days(13);

    let board = group_leaderboard(&matches, &members, now);
    assert_eq!(board.len(), 3);
    assert_eq!(board[0].user.id, carol.id);
    assert_eq!(board[0].streak, 3);
    assert!(board[0].is_on_fire);
    assert_eq!(board[0].form[..3], [FormResult::Win; 3]);
    // Carol was second a week ago
    assert_eq!(board[0].rank_change, RankChange::Moved(1));
    assert_eq!(board[1].user.id, alice.id);
    assert_eq!(board[1].rank_change, RankChange::Moved(-1));

    let ranking = rank_in(&board, bob.id, uuid::Uuid::new_v4(), "Tuesday Club");
    assert_eq!(ranking.rank, Some(3));
    assert!(ranking.points_to_overtake.unwrap() > 0.0);
}

#[test]
fn test_player_stats_agree_with_running_record() {
    let alice = create_test_member("Alice");
    let bob = create_test_member("Bob");
    let results = [(11, 3), (11, 5), (7, 11), (11, 9), (11, 2)];
    let matches: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(i, s)| create_singles(&alice, &bob, *s, i as i64))
        .collect();

    let mut record = ladder_types::PlayerRecord::default();
    for m in &matches {
        record.apply(outcome_for(m, alice.id) == Some(ladder_types::Outcome::Win));
    }

    let stats = calculate_stats(&matches, alice.id);
    assert_eq!(stats.wins as i32, record.wins);
    assert_eq!(stats.losses as i32, record.losses);
    assert_eq!(stats.current_streak as i32, record.current_streak);
    assert_eq!(stats.streak_type, record.streak_type);
    assert_eq!(stats.streak_type, Some(StreakType::W));
    assert_eq!(all_time_streaks(&matches, alice.id), (2, 2));
}

#[test]
fn test_tournament_round_robin() {
    let players: Vec<_> = ["Ann", "Ben", "Cat", "Dee"]
        .iter()
        .map(|n| create_test_member(n))
        .collect();
    let names: HashMap<_, _> = players
        .iter()
        .map(|p| (p.id, p.display_name.clone()))
        .collect();

    // Ann wins everything, Dee loses everything
    let mut matches = Vec::new();
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            matches.push(create_singles(&players[i], &players[j], (11, 5 + j as i32), 0));
        }
    }

    let standings = tournament_standings(&matches, ladder_types::MatchType::Singles, &names);
    let order: Vec<&str> = standings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(order, vec!["Ann", "Ben", "Cat", "Dee"]);
    assert_eq!(standings[0].wins, 3);
    assert_eq!(standings[3].losses, 3);

    let podium = podium(&standings, ladder_types::TournamentStatus::Completed);
    assert_eq!(podium.len(), 3);
}
