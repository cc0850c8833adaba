//! Request-level operations. Each function checks permissions, talks to the
//! repositories and folds the results with `ladder_core`.

pub mod admin;
pub mod groups;
pub mod matches;
pub mod teams;
pub mod tournaments;
pub mod users;

use std::collections::{HashMap, HashSet};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use ladder_core::{outcome_for, summarize, team_display_name};
use ladder_types::{Match, MatchView, User, UserSummary};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]{3,30}$").expect("valid username pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ApiError::validation(
            "Username must be 3-30 letters, digits, dots or underscores",
        ))
    }
}

/// Trimmed and lower-cased address, or a validation error.
pub(crate) fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(ApiError::validation("Invalid email address"))
    }
}

pub(crate) fn require_name(name: &str, what: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation(format!("{what} name is required")));
    }
    Ok(name.to_string())
}

/// Random URL-safe token for invite links.
pub(crate) fn new_token() -> String {
    let mut bytes = Vec::with_capacity(32);
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Stored form of an emailed token.
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub(crate) async fn require_user(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub(crate) async fn load_users(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, User>, ApiError> {
    let ids: Vec<Uuid> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
    let users = state.users.find_by_ids(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Summaries for `ids` in the given order. Unknown ids are skipped.
pub(crate) fn summaries_for(users: &HashMap<Uuid, User>, ids: &[Uuid]) -> Vec<UserSummary> {
    ids.iter().filter_map(|id| users.get(id)).map(summarize).collect()
}

pub(crate) async fn load_summaries(
    state: &AppState,
    ids: &[Uuid],
) -> Result<Vec<UserSummary>, ApiError> {
    let users = load_users(state, ids.iter().copied()).await?;
    Ok(summaries_for(&users, ids))
}

/// Matches with names resolved for display, in the order given.
pub(crate) async fn match_views(
    state: &AppState,
    matches: &[Match],
    viewer: Option<Uuid>,
) -> Result<Vec<MatchView>, ApiError> {
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let users = load_users(state, matches.iter().flat_map(|m| m.participants())).await?;

    let team_ids: Vec<Uuid> = matches
        .iter()
        .flat_map(|m| [m.team1_id, m.team2_id])
        .flatten()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let teams: HashMap<Uuid, String> = state
        .teams
        .find_by_ids(&team_ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let tournament_ids: Vec<Uuid> = matches
        .iter()
        .filter_map(|m| m.tournament_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let tournaments: HashMap<Uuid, String> = state
        .tournaments
        .find_by_ids(&tournament_ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let side_name = |members: &[UserSummary], team_id: Option<Uuid>| -> String {
        match team_id.and_then(|id| teams.get(&id)) {
            Some(stored) => team_display_name(stored, members),
            None if members.is_empty() => "Unknown Player".to_string(),
            None => members
                .iter()
                .map(|m| m.display_name.as_str())
                .collect::<Vec<_>>()
                .join(" & "),
        }
    };

    Ok(matches
        .iter()
        .map(|m| {
            let team1 = summaries_for(&users, &m.team1);
            let team2 = summaries_for(&users, &m.team2);
            MatchView {
                id: m.id,
                match_type: m.match_type,
                team1_name: side_name(&team1, m.team1_id),
                team2_name: side_name(&team2, m.team2_id),
                team1,
                team2,
                team1_score: m.team1_score,
                team2_score: m.team2_score,
                winner: m.winner,
                is_upset: m.is_upset,
                match_date: m.match_date,
                group_id: m.group_id,
                tournament_id: m.tournament_id,
                tournament_name: m.tournament_id.and_then(|id| tournaments.get(&id).cloned()),
                viewer_outcome: viewer.and_then(|v| outcome_for(m, v)),
            }
        })
        .collect())
}
