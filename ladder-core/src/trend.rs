use ladder_types::{Match, TrendData, TrendDataset, UserId};
use std::collections::HashMap;

use crate::oldest_first;

#[derive(Default, Clone, Copy)]
struct Running {
    total: i64,
    games: u32,
}

impl Running {
    fn average(&self) -> Option<f64> {
        (self.games > 0).then(|| self.total as f64 / self.games as f64)
    }
}

/// Running average score per player, sampled at the end of every day that
/// had a match.
pub fn leaderboard_trend(matches: &[Match], names: &HashMap<UserId, String>) -> TrendData {
    let ordered = oldest_first(matches);

    let mut players: Vec<UserId> = Vec::new();
    for m in &ordered {
        for player in m.participants() {
            if !players.contains(&player) {
                players.push(player);
            }
        }
    }

    let mut running: HashMap<UserId, Running> =
        players.iter().map(|p| (*p, Running::default())).collect();
    let mut series: HashMap<UserId, Vec<Option<f64>>> =
        players.iter().map(|p| (*p, Vec::new())).collect();
    let mut labels: Vec<String> = Vec::new();

    for (i, m) in ordered.iter().enumerate() {
        for player in m.participants() {
            if let (Some(side), Some(entry)) = (m.side_of(player), running.get_mut(&player)) {
                entry.total += m.score(side) as i64;
                entry.games += 1;
            }
        }

        let day = m.match_date.format("%Y-%m-%d").to_string();
        let day_ends = ordered
            .get(i + 1)
            .is_none_or(|next| next.match_date.format("%Y-%m-%d").to_string() != day);
        if day_ends {
            labels.push(day);
            for player in &players {
                let point = running.get(player).and_then(Running::average);
                if let Some(points) = series.get_mut(player) {
                    points.push(point);
                }
            }
        }
    }

    let datasets = players
        .into_iter()
        .map(|player| TrendDataset {
            user_id: player,
            label: names
                .get(&player)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            data: series.remove(&player).unwrap_or_default(),
        })
        .collect();

    TrendData { labels, datasets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ladder_types::{MatchType, Side};
    use uuid::Uuid;

    fn game(a: UserId, b: UserId, sa: i32, sb: i32, day: u32, hour: u32) -> Match {
        let date = Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap();
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
    fn test_empty_trend() {
        let trend = leaderboard_trend(&[], &HashMap::new());
        assert!(trend.labels.is_empty());
        assert!(trend.datasets.is_empty());
    }

    #[test]
    fn test_running_average_per_day() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let names: HashMap<UserId, String> = [(a, "Ann".to_string())].into();
        let matches = vec![
            game(a, c, 9, 11, 3, 9),
            game(a, b, 11, 5, 1, 9),
            game(a, b, 11, 7, 1, 17),
        ];

        let trend = leaderboard_trend(&matches, &names);
        assert_eq!(trend.labels, vec!["2024-06-01", "2024-06-03"]);

        let ann = &trend.datasets[0];
        assert_eq!(ann.label, "Ann");
        assert_eq!(ann.data, vec![Some(11.0), Some(31.0 / 3.0)]);

        let bob = trend.datasets.iter().find(|d| d.user_id == b).unwrap();
        assert_eq!(bob.label, "Unknown");
        assert_eq!(bob.data, vec![Some(6.0), Some(6.0)]);

        let cat = trend.datasets.iter().find(|d| d.user_id == c).unwrap();
        assert_eq!(cat.data, vec![None, Some(11.0)]);
    }
}
