use ladder_types::{MatchSubmission, MatchType, Side, UserId};
use std::collections::HashSet;
use thiserror::Error;

pub const MIN_WINNING_SCORE: i32 = 11;
pub const MIN_WIN_MARGIN: i32 = 2;
pub const UPSET_THRESHOLD: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchValidationError {
    #[error("Scores cannot be negative")]
    NegativeScore,
    #[error("Scores cannot be the same")]
    TiedScore,
    #[error("The winning side must score at least 11 points")]
    WinnerBelowMinimum,
    #[error("The game must be won by at least 2 points")]
    MarginTooSmall,
    #[error("A partner is required for doubles")]
    MissingPartner,
    #[error("A second opponent is required for doubles")]
    MissingOpponent,
    #[error("All players must be unique")]
    DuplicatePlayers,
}

/// A validated submission with both sides resolved to player ids.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchLineup {
    pub match_type: MatchType,
    pub team1: Vec<UserId>,
    pub team2: Vec<UserId>,
    pub team1_score: i32,
    pub team2_score: i32,
}

impl MatchLineup {
    pub fn winner(&self) -> Side {
        winner_of(self.team1_score, self.team2_score)
    }

    pub fn players(&self) -> impl Iterator<Item = UserId> + '_ {
        self.team1.iter().chain(self.team2.iter()).copied()
    }
}

pub fn validate_scores(score1: i32, score2: i32) -> Result<(), MatchValidationError> {
    if score1 < 0 || score2 < 0 {
        return Err(MatchValidationError::NegativeScore);
    }
    if score1 == score2 {
        return Err(MatchValidationError::TiedScore);
    }
    if score1.max(score2) < MIN_WINNING_SCORE {
        return Err(MatchValidationError::WinnerBelowMinimum);
    }
    if (score1 - score2).abs() < MIN_WIN_MARGIN {
        return Err(MatchValidationError::MarginTooSmall);
    }
    Ok(())
}

/// Validate a submission and resolve its lineup. `player1` falls back to
/// the submitter.
pub fn validate_submission(
    submission: &MatchSubmission,
    submitter: UserId,
) -> Result<MatchLineup, MatchValidationError> {
    validate_scores(submission.player1_score, submission.player2_score)?;

    let player1 = submission.player1.unwrap_or(submitter);
    let (team1, team2) = match submission.match_type {
        MatchType::Singles => (vec![player1], vec![submission.player2]),
        MatchType::Doubles => {
            let partner = submission
                .partner
                .ok_or(MatchValidationError::MissingPartner)?;
            let opponent2 = submission
                .opponent2
                .ok_or(MatchValidationError::MissingOpponent)?;
            (vec![player1, partner], vec![submission.player2, opponent2])
        }
    };

    let unique: HashSet<UserId> = team1.iter().chain(team2.iter()).copied().collect();
    if unique.len() != team1.len() + team2.len() {
        return Err(MatchValidationError::DuplicatePlayers);
    }

    Ok(MatchLineup {
        match_type: submission.match_type,
        team1,
        team2,
        team1_score: submission.player1_score,
        team2_score: submission.player2_score,
    })
}

/// Team 1 wins only with a strictly higher score.
pub fn winner_of(team1_score: i32, team2_score: i32) -> Side {
    if team1_score > team2_score {
        Side::Team1
    } else {
        Side::Team2
    }
}

/// Mean rating of one side; unrated players count as zero.
pub fn side_rating(ratings: &[Option<f64>]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| r.unwrap_or(0.0)).sum::<f64>() / ratings.len() as f64
}

pub fn is_upset(winner_rating: f64, loser_rating: f64) -> bool {
    loser_rating - winner_rating >= UPSET_THRESHOLD
}

/// Upset highlighted on group pages. Requires both sides to be rated.
pub fn is_giant_slayer(winner_rating: Option<f64>, loser_rating: Option<f64>) -> bool {
    match (winner_rating, loser_rating) {
        (Some(winner), Some(loser)) if winner > 0.0 && loser > 0.0 => is_upset(winner, loser),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn singles(player2: UserId, s1: i32, s2: i32) -> MatchSubmission {
        MatchSubmission {
            match_type: MatchType::Singles,
            player1: None,
            partner: None,
            player2,
            opponent2: None,
            player1_score: s1,
            player2_score: s2,
            match_date: None,
            group_id: None,
            tournament_id: None,
        }
    }

    #[test]
    fn test_equal_scores_are_rejected() {
        let result = validate_submission(&singles(Uuid::new_v4(), 11, 11), Uuid::new_v4());
        assert_eq!(result, Err(MatchValidationError::TiedScore));
    }

    #[test]
    fn test_score_rules() {
        assert_eq!(validate_scores(-1, 11), Err(MatchValidationError::NegativeScore));
        assert_eq!(validate_scores(10, 8), Err(MatchValidationError::WinnerBelowMinimum));
        assert_eq!(validate_scores(11, 10), Err(MatchValidationError::MarginTooSmall));
        assert_eq!(validate_scores(12, 10), Ok(()));
        assert_eq!(validate_scores(3, 11), Ok(()));
    }

    #[test]
    fn test_player1_defaults_to_submitter() {
        let me = Uuid::new_v4();
        let them = Uuid::new_v4();
        let lineup = validate_submission(&singles(them, 11, 4), me).unwrap();
        assert_eq!(lineup.team1, vec![me]);
        assert_eq!(lineup.team2, vec![them]);
        assert_eq!(lineup.winner(), Side::Team1);
    }

    #[test]
    fn test_singles_against_self_is_rejected() {
        let me = Uuid::new_v4();
        let result = validate_submission(&singles(me, 11, 4), me);
        assert_eq!(result, Err(MatchValidationError::DuplicatePlayers));
    }

    #[test]
    fn test_doubles_requires_four_unique_players() {
        let me = Uuid::new_v4();
        let partner = Uuid::new_v4();
        let opponent = Uuid::new_v4();
        let mut submission = singles(opponent, 11, 7);
        submission.match_type = MatchType::Doubles;

        assert_eq!(
            validate_submission(&submission, me),
            Err(MatchValidationError::MissingPartner)
        );

        submission.partner = Some(partner);
        assert_eq!(
            validate_submission(&submission, me),
            Err(MatchValidationError::MissingOpponent)
        );

        submission.opponent2 = Some(partner);
        assert_eq!(
            validate_submission(&submission, me),
            Err(MatchValidationError::DuplicatePlayers)
        );

        let opponent2 = Uuid::new_v4();
        submission.opponent2 = Some(opponent2);
        let lineup = validate_submission(&submission, me).unwrap();
        assert_eq!(lineup.team1, vec![me, partner]);
        assert_eq!(lineup.team2, vec![opponent, opponent2]);
    }

    #[test]
    fn test_upset_detection() {
        assert!(is_upset(3.0, 3.5));
        assert!(is_upset(3.25, 3.5));
        assert!(!is_upset(3.5, 3.0));
        assert!(!is_upset(3.4, 3.5));
        // Unrated winner beating a rated player
        assert!(is_upset(side_rating(&[None]), side_rating(&[Some(3.0)])));
    }

    #[test]
    fn test_doubles_side_rating_is_mean() {
        assert_eq!(side_rating(&[Some(3.0), Some(4.0)]), 3.5);
        assert_eq!(side_rating(&[Some(4.0), None]), 2.0);
        assert_eq!(side_rating(&[]), 0.0);
    }

    #[test]
    fn test_giant_slayer_requires_ratings() {
        assert!(is_giant_slayer(Some(3.0), Some(4.0)));
        assert!(!is_giant_slayer(None, Some(4.0)));
        assert!(!is_giant_slayer(Some(0.0), Some(4.0)));
        assert!(!is_giant_slayer(Some(4.0), Some(3.0)));
    }
}
