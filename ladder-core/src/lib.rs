pub mod badges;
pub mod display;
pub mod leaderboard;
pub mod match_rules;
pub mod player_stats;
pub mod prediction;
pub mod rivalry;
pub mod standings;
pub mod trend;

// Re-export main components
pub use badges::*;
pub use display::*;
pub use leaderboard::*;
pub use match_rules::*;
pub use player_stats::*;
pub use prediction::*;
pub use rivalry::*;
pub use standings::*;
pub use trend::*;

use ladder_types::Match;

/// References to `matches` ordered newest first. Ties keep their
/// original order.
pub(crate) fn newest_first(matches: &[Match]) -> Vec<&Match> {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by(|a, b| b.match_date.cmp(&a.match_date));
    sorted
}

pub(crate) fn oldest_first(matches: &[Match]) -> Vec<&Match> {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by(|a, b| a.match_date.cmp(&b.match_date));
    sorted
}
