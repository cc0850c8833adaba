use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{load_users, match_views, summaries_for};
use crate::error::ApiError;
use crate::state::AppState;
use ladder_core::{
    MatchLineup, calculate_stats, evaluate_post_match, global_leaderboard as rank_players,
    is_upset, predict_matchup, side_rating, summarize, validate_submission,
};
use ladder_persistence::MatchMeta;
use ladder_types::{
    GlobalLeaderboard, MatchCursor, MatchPage, MatchSubmission, MatchView, ParticipantStatus,
    Prediction, Side, TournamentStatus, User,
};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const LATEST_MATCHES_LIMIT: u64 = 10;

pub fn encode_cursor(cursor: &MatchCursor) -> Result<String, ApiError> {
    let json = serde_json::to_vec(cursor).map_err(anyhow::Error::from)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_cursor(token: &str) -> Result<MatchCursor, ApiError> {
    URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| ApiError::validation("Invalid cursor"))
}

/// Checks that the lineup may be stored under the submission's group or
/// tournament.
async fn check_context(
    state: &AppState,
    submission: &MatchSubmission,
    lineup: &MatchLineup,
) -> Result<(), ApiError> {
    if let Some(group_id) = submission.group_id {
        state
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Group"))?;
        let members: HashSet<Uuid> = state.groups.member_ids(group_id).await?.into_iter().collect();
        if !lineup.players().all(|p| members.contains(&p)) {
            return Err(ApiError::validation(
                "All players must be members of the group",
            ));
        }
    }

    if let Some(tournament_id) = submission.tournament_id {
        let tournament = state
            .tournaments
            .find_by_id(tournament_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tournament"))?;
        if tournament.status == TournamentStatus::Completed {
            return Err(ApiError::validation("Tournament is already completed"));
        }
        if tournament.match_type != lineup.match_type {
            return Err(ApiError::validation(format!(
                "This tournament is played as {}",
                tournament.match_type.as_str()
            )));
        }
        let accepted: HashSet<Uuid> = state
            .tournaments
            .participants(tournament_id)
            .await?
            .into_iter()
            .filter(|p| p.status == ParticipantStatus::Accepted)
            .map(|p| p.user_id)
            .collect();
        if !lineup.players().all(|p| accepted.contains(&p)) {
            return Err(ApiError::validation(
                "All players must be accepted tournament participants",
            ));
        }
    }
    Ok(())
}

fn match_timestamp(date: Option<NaiveDate>) -> Result<chrono::DateTime<Utc>, ApiError> {
    let now = Utc::now();
    match date {
        None => Ok(now),
        Some(date) if date > now.date_naive() => {
            Err(ApiError::validation("Match date cannot be in the future"))
        }
        // Keep the time of day so same-day matches stay in submission order.
        Some(date) => Ok(date.and_time(now.time()).and_utc()),
    }
}

/// Validates and stores a match, then awards any badges it earned.
pub async fn record_match(
    state: &AppState,
    user: &User,
    submission: MatchSubmission,
) -> Result<MatchView, ApiError> {
    let lineup = validate_submission(&submission, user.id)?;
    // Only well-formed submissions count against the quota.
    if !state.match_limits.check(user.id) {
        return Err(ApiError::RateLimited);
    }
    if !user.is_admin && !lineup.players().any(|p| p == user.id) {
        return Err(ApiError::forbidden(
            "You can only record matches you played in",
        ));
    }

    let players = load_users(state, lineup.players()).await?;
    if players.len() != lineup.team1.len() + lineup.team2.len() {
        return Err(ApiError::not_found("Player"));
    }
    check_context(state, &submission, &lineup).await?;

    let rating = |ids: &[Uuid]| {
        let ratings: Vec<Option<f64>> = ids
            .iter()
            .map(|id| players.get(id).and_then(|u| u.dupr_rating))
            .collect();
        side_rating(&ratings)
    };
    let (winners, losers) = match lineup.winner() {
        Side::Team1 => (lineup.team1.as_slice(), lineup.team2.as_slice()),
        Side::Team2 => (lineup.team2.as_slice(), lineup.team1.as_slice()),
    };
    let upset = is_upset(rating(winners), rating(losers));

    let recorded = state
        .matches
        .record(
            &lineup,
            MatchMeta {
                match_date: match_timestamp(submission.match_date)?,
                group_id: submission.group_id,
                tournament_id: submission.tournament_id,
                recorded_by: user.id,
                is_upset: upset,
            },
        )
        .await?;

    for player_id in lineup.players() {
        let history = state.matches.all_for_user(player_id).await?;
        let stats = calculate_stats(&history, player_id);
        for badge in evaluate_post_match(&stats) {
            state.badges.award(player_id, badge).await?;
        }
    }

    let mut views = match_views(state, std::slice::from_ref(&recorded), Some(user.id)).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Recorded match has no view")))
}

pub async fn list_matches(
    state: &AppState,
    user: &User,
    limit: Option<u64>,
    before: Option<&str>,
) -> Result<MatchPage, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let cursor = before.map(decode_cursor).transpose()?;

    let mut page = state
        .matches
        .for_user(user.id, limit + 1, cursor.as_ref())
        .await?;
    let has_more = page.len() as u64 > limit;
    page.truncate(limit as usize);

    let next_cursor = match page.last() {
        Some(last) if has_more => Some(encode_cursor(&MatchCursor {
            match_date: last.match_date,
            id: last.id,
        })?),
        _ => None,
    };

    Ok(MatchPage {
        matches: match_views(state, &page, Some(user.id)).await?,
        next_cursor,
    })
}

pub async fn get_match(state: &AppState, viewer: &User, id: Uuid) -> Result<MatchView, ApiError> {
    let found = state
        .matches
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Match"))?;
    let mut views = match_views(state, std::slice::from_ref(&found), Some(viewer.id)).await?;
    views.pop().ok_or_else(|| ApiError::not_found("Match"))
}

pub async fn global_leaderboard(state: &AppState) -> Result<GlobalLeaderboard, ApiError> {
    let users = state.users.all_users().await?;
    let players: Vec<_> = users
        .iter()
        .filter(|u| !u.is_ghost)
        .map(|u| (summarize(u), u.record.clone()))
        .collect();
    let latest = state.matches.latest(LATEST_MATCHES_LIMIT).await?;

    Ok(GlobalLeaderboard {
        players: rank_players(&players, state.config.global_leaderboard_min_games),
        latest_matches: match_views(state, &latest, None).await?,
    })
}

pub async fn predict(
    state: &AppState,
    team1: &[Uuid],
    team2: &[Uuid],
) -> Result<Prediction, ApiError> {
    let sizes_ok = |team: &[Uuid]| (1..=2).contains(&team.len());
    if !sizes_ok(team1) || !sizes_ok(team2) || team1.len() != team2.len() {
        return Err(ApiError::validation(
            "Each team needs the same number of players, one or two",
        ));
    }
    let everyone: HashSet<Uuid> = team1.iter().chain(team2).copied().collect();
    if everyone.len() != team1.len() + team2.len() {
        return Err(ApiError::validation("All players must be unique"));
    }

    let ids: Vec<Uuid> = everyone.into_iter().collect();
    let known = load_users(state, ids.iter().copied()).await?;
    if summaries_for(&known, &ids).len() != ids.len() {
        return Err(ApiError::not_found("Player"));
    }

    let history = state.matches.for_users(&ids).await?;
    Ok(predict_matchup(&history, team1, team2))
}
