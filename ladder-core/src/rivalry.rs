use ladder_types::{
    Match, MatchType, PartnershipRecord, RivalryStats, Team, TeamId, TeamStanding, UserId,
    UserSummary,
};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::oldest_first;
use crate::player_stats::outcome_for;
use ladder_types::Outcome;

/// Doubles record of `a` and `b` playing on the same side.
pub fn partnership_record(a: UserId, b: UserId, matches: &[Match]) -> PartnershipRecord {
    let mut record = PartnershipRecord::default();
    for m in matches.iter().filter(|m| m.match_type == MatchType::Doubles) {
        let (Some(side_a), Some(side_b)) = (m.side_of(a), m.side_of(b)) else {
            continue;
        };
        if side_a != side_b {
            continue;
        }
        match outcome_for(m, a) {
            Some(Outcome::Win) => record.wins += 1,
            Some(Outcome::Loss) => record.losses += 1,
            _ => {}
        }
    }
    record
}

/// Rivalry of `a` against `b` within a set of matches, from `a`'s side.
pub fn group_head_to_head(a: UserId, b: UserId, matches: &[Match]) -> RivalryStats {
    let mut stats = RivalryStats::default();
    let mut scored: i64 = 0;
    let mut conceded: i64 = 0;

    for m in matches {
        let (Some(side_a), Some(side_b)) = (m.side_of(a), m.side_of(b)) else {
            continue;
        };
        if side_a == side_b {
            continue;
        }
        let own = m.score(side_a);
        let other = m.score(side_b);
        stats.match_ids.push(m.id);
        stats.point_diff += own - other;
        scored += own as i64;
        conceded += other as i64;
        if own > other {
            stats.wins += 1;
        } else if other > own {
            stats.losses += 1;
        }
    }

    let played = stats.match_ids.len();
    if played > 0 {
        stats.avg_points_scored = scored as f64 / played as f64;
        stats.avg_points_conceded = conceded as f64 / played as f64;
    }
    stats.partnership = partnership_record(a, b, matches);
    stats
}

/// Current and longest winning runs, walking from the oldest match. Any
/// result other than a win resets the current run.
pub fn all_time_streaks(matches: &[Match], user_id: UserId) -> (u32, u32) {
    let mut current = 0;
    let mut longest = 0;
    for m in oldest_first(matches) {
        match outcome_for(m, user_id) {
            None => continue,
            Some(Outcome::Win) => current += 1,
            Some(_) => {
                longest = longest.max(current);
                current = 0;
            }
        }
    }
    (current, longest.max(current))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Per-team record over the doubles matches that carry team ids.
pub fn team_stats(matches: &[Match]) -> HashMap<TeamId, TeamRecord> {
    let mut records: HashMap<TeamId, TeamRecord> = HashMap::new();
    for m in matches.iter().filter(|m| m.match_type == MatchType::Doubles) {
        if m.is_draw() {
            continue;
        }
        let winner = m.winner;
        if let Some(id) = m.team_id(winner) {
            records.entry(id).or_default().wins += 1;
        }
        if let Some(id) = m.team_id(winner.opposite()) {
            records.entry(id).or_default().losses += 1;
        }
    }
    records
}

/// Default team names are regenerated from current member names so that
/// renames show up; custom names are kept.
pub fn team_display_name(stored: &str, members: &[UserSummary]) -> String {
    if members.len() == 2 && stored.contains(" & ") {
        members
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>()
            .join(" & ")
    } else {
        stored.to_string()
    }
}

/// Teams with at least one game, best win percentage first.
pub fn team_leaderboard(
    teams: &[(Team, Vec<UserSummary>)],
    stats: &HashMap<TeamId, TeamRecord>,
) -> Vec<TeamStanding> {
    let mut board: Vec<TeamStanding> = teams
        .iter()
        .filter_map(|(team, members)| {
            let record = stats.get(&team.id).copied().unwrap_or_default();
            if record.games() == 0 {
                return None;
            }
            Some(TeamStanding {
                team_id: team.id,
                name: team_display_name(&team.name, members),
                members: members.clone(),
                wins: record.wins,
                losses: record.losses,
                games: record.games(),
                win_percentage: record.wins as f64 / record.games() as f64 * 100.0,
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

/// The partnership with the most wins together, if any team has won.
pub fn best_buds(board: &[TeamStanding]) -> Option<TeamStanding> {
    let mut best: Option<&TeamStanding> = None;
    for standing in board {
        if standing.wins == 0 {
            continue;
        }
        if best.is_none_or(|b| standing.wins > b.wins) {
            best = Some(standing);
        }
    }
    best.cloned()
}
