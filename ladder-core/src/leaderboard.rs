use chrono::{DateTime, Duration, Utc};
use ladder_types::{
    FormResult, GlobalLeaderboardEntry, GroupId, GroupRanking, LeaderboardEntry, Match,
    PlayerRecord, RankChange, UserId, UserSummary,
};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::newest_first;
use crate::player_stats::outcome_for;
use ladder_types::Outcome;

pub const FORM_LENGTH: usize = 5;
pub const HOT_STREAK_THRESHOLD: u32 = 3;
pub const RANK_TREND_WINDOW_DAYS: i64 = 7;

#[derive(Default)]
struct Tally {
    wins: u32,
    losses: u32,
    games: u32,
    total_score: i64,
    results: Vec<FormResult>,
}

/// Fold `matches` into one entry per member, sorted by average score,
/// then wins, then games played (all descending). Players who are not
/// members are ignored.
pub fn build_leaderboard(matches: &[Match], members: &[UserSummary]) -> Vec<LeaderboardEntry> {
    let mut tallies: HashMap<UserId, Tally> =
        members.iter().map(|m| (m.id, Tally::default())).collect();

    for m in newest_first(matches) {
        for player in m.participants() {
            let Some(tally) = tallies.get_mut(&player) else {
                continue;
            };
            let Some(side) = m.side_of(player) else {
                continue;
            };
            tally.games += 1;
            tally.total_score += m.score(side) as i64;
            match outcome_for(m, player) {
                Some(Outcome::Win) => {
                    tally.wins += 1;
                    tally.results.push(FormResult::Win);
                }
                Some(Outcome::Loss) => {
                    tally.losses += 1;
                    tally.results.push(FormResult::Loss);
                }
                // A draw is not a loss but still shows as one in form.
                _ => tally.results.push(FormResult::Loss),
            }
        }
    }

    let mut board: Vec<LeaderboardEntry> = members
        .iter()
        .map(|member| {
            let tally = tallies.remove(&member.id).unwrap_or_default();
            let (avg_score, win_rate) = if tally.games > 0 {
                (
                    tally.total_score as f64 / tally.games as f64,
                    tally.wins as f64 / tally.games as f64 * 100.0,
                )
            } else {
                (0.0, 0.0)
            };
            LeaderboardEntry {
                user: member.clone(),
                wins: tally.wins,
                losses: tally.losses,
                games_played: tally.games,
                total_score: tally.total_score,
                avg_score,
                win_rate,
                form: tally.results.into_iter().take(FORM_LENGTH).collect(),
                rank_change: RankChange::New,
                streak: 0,
                is_on_fire: false,
            }
        })
        .collect();

    board.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(Ordering::Equal)
            .then(b.wins.cmp(&a.wins))
            .then(b.games_played.cmp(&a.games_played))
    });
    board
}

/// Positive values mean the player climbed since `previous`.
pub fn apply_rank_changes(current: &mut [LeaderboardEntry], previous: &[LeaderboardEntry]) {
    let last_ranks: HashMap<UserId, i32> = previous
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.user.id, i as i32 + 1))
        .collect();

    for (i, entry) in current.iter_mut().enumerate() {
        let current_rank = i as i32 + 1;
        entry.rank_change = match last_ranks.get(&entry.user.id) {
            Some(last_rank) => RankChange::Moved(last_rank - current_rank),
            None => RankChange::New,
        };
    }
}

/// Winning run from the newest match. A draw or a loss ends it.
pub fn winning_streak(matches: &[Match], user_id: UserId) -> u32 {
    let mut streak = 0;
    for m in newest_first(matches) {
        match outcome_for(m, user_id) {
            None => continue,
            Some(Outcome::Win) => streak += 1,
            Some(_) => break,
        }
    }
    streak
}

pub fn apply_winning_streaks(entries: &mut [LeaderboardEntry], matches: &[Match]) {
    for entry in entries.iter_mut() {
        entry.streak = winning_streak(matches, entry.user.id);
        entry.is_on_fire = entry.streak >= HOT_STREAK_THRESHOLD;
    }
}

/// Full group board: current standings, movement against the board as it
/// stood a week before `now`, and winning streaks.
pub fn group_leaderboard(
    matches: &[Match],
    members: &[UserSummary],
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let mut current = build_leaderboard(matches, members);

    let cutoff = now - Duration::days(RANK_TREND_WINDOW_DAYS);
    let older: Vec<Match> = matches
        .iter()
        .filter(|m| m.match_date < cutoff)
        .cloned()
        .collect();
    let previous = build_leaderboard(&older, members);

    apply_rank_changes(&mut current, &previous);
    apply_winning_streaks(&mut current, matches);
    current
}

/// Site-wide board from denormalized records, best win percentage first.
pub fn global_leaderboard(
    players: &[(UserSummary, PlayerRecord)],
    min_games: u32,
) -> Vec<GlobalLeaderboardEntry> {
    let mut board: Vec<GlobalLeaderboardEntry> = players
        .iter()
        .filter_map(|(user, record)| {
            let wins = record.wins.max(0) as u32;
            let losses = record.losses.max(0) as u32;
            let games_played = wins + losses;
            if games_played < min_games || games_played == 0 {
                return None;
            }
            Some(GlobalLeaderboardEntry {
                user: user.clone(),
                wins,
                losses,
                games_played,
                win_percentage: wins as f64 / games_played as f64 * 100.0,
            })
        })
        .collect();

    board.sort_by(|a, b| {
        b.win_percentage
            .partial_cmp(&a.win_percentage)
            .unwrap_or(Ordering::Equal)
            .then(b.wins.cmp(&a.wins))
    });
    board
}

/// Position of `user_id` on `board` plus the gap to the player directly
/// above.
pub fn rank_in(
    board: &[LeaderboardEntry],
    user_id: UserId,
    group_id: GroupId,
    group_name: &str,
) -> GroupRanking {
    let Some(index) = board.iter().position(|e| e.user.id == user_id) else {
        return GroupRanking {
            group_id,
            group_name: group_name.to_string(),
            rank: None,
            points: 0.0,
            form: Vec::new(),
            player_above: None,
            points_to_overtake: None,
        };
    };

    let entry = &board[index];
    let above = index.checked_sub(1).map(|i| &board[i]);
    GroupRanking {
        group_id,
        group_name: group_name.to_string(),
        rank: Some(index as u32 + 1),
        points: entry.avg_score,
        form: entry.form.clone(),
        player_above: above.map(|a| a.user.display_name.clone()),
        points_to_overtake: above.map(|a| a.avg_score - entry.avg_score),
    }
}
