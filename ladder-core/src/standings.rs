use ladder_types::{Match, MatchType, Side, Standing, TournamentStatus};
use std::collections::HashMap;
use uuid::Uuid;

use crate::match_rules::winner_of;

pub const PODIUM_SIZE: usize = 3;

/// Fold tournament matches into a standings table. Singles rows are keyed
/// by player, doubles rows by team. `names` resolves row ids to labels.
pub fn tournament_standings(
    matches: &[Match],
    match_type: MatchType,
    names: &HashMap<Uuid, String>,
) -> Vec<Standing> {
    let mut rows: HashMap<Uuid, Standing> = HashMap::new();
    let mut order: Vec<Uuid> = Vec::new();

    for m in matches {
        let key = |side: Side| match match_type {
            MatchType::Singles => m.players(side).first().copied(),
            MatchType::Doubles => m.team_id(side),
        };
        let (Some(id1), Some(id2)) = (key(Side::Team1), key(Side::Team2)) else {
            continue;
        };

        for id in [id1, id2] {
            rows.entry(id).or_insert_with(|| {
                order.push(id);
                Standing {
                    id,
                    name: String::new(),
                    wins: 0,
                    losses: 0,
                    point_diff: 0,
                }
            });
        }

        let (winner, loser) = match winner_of(m.team1_score, m.team2_score) {
            Side::Team1 => (id1, id2),
            Side::Team2 => (id2, id1),
        };
        if let Some(row) = rows.get_mut(&winner) {
            row.wins += 1;
        }
        if let Some(row) = rows.get_mut(&loser) {
            row.losses += 1;
        }
        if let Some(row) = rows.get_mut(&id1) {
            row.point_diff += m.team1_score - m.team2_score;
        }
        if let Some(row) = rows.get_mut(&id2) {
            row.point_diff += m.team2_score - m.team1_score;
        }
    }

    let fallback = match match_type {
        MatchType::Singles => "Unknown Player",
        MatchType::Doubles => "Unknown Team",
    };
    let mut standings: Vec<Standing> = order
        .into_iter()
        .filter_map(|id| rows.remove(&id))
        .map(|mut row| {
            row.name = names
                .get(&row.id)
                .cloned()
                .unwrap_or_else(|| fallback.to_string());
            row
        })
        .collect();

    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(a.losses.cmp(&b.losses))
            .then(b.point_diff.cmp(&a.point_diff))
    });
    standings
}

/// Top finishers, only once the tournament is over.
pub fn podium(standings: &[Standing], status: TournamentStatus) -> Vec<Standing> {
    if status != TournamentStatus::Completed {
        return Vec::new();
    }
    standings.iter().take(PODIUM_SIZE).cloned().collect()
}
