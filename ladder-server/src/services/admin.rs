use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::require_user;
use crate::error::ApiError;
use crate::state::AppState;
use ladder_types::{
    AdminStats, Announcement, AnnouncementRequest, FriendGraph, GraphEdge, GraphNode, MergeRequest,
    User,
};

/// When on, users whose email is unverified are turned away.
pub const ENFORCE_EMAIL_VERIFICATION: &str = "enforce_email_verification";

/// Settings an admin may flip.
pub const KNOWN_SETTINGS: [&str; 1] = [ENFORCE_EMAIL_VERIFICATION];

pub async fn stats(state: &AppState) -> Result<AdminStats, ApiError> {
    let now = Utc::now();
    let yesterday = (now.date_naive() - Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);

    Ok(AdminStats {
        total_users: state.users.count().await?,
        active_tournaments: state.tournaments.count_not_completed().await?,
        recent_matches: state.matches.count_since(yesterday).await?,
        generated_at: now,
    })
}

pub async fn friend_graph(state: &AppState) -> Result<FriendGraph, ApiError> {
    let nodes = state
        .users
        .all_users()
        .await?
        .into_iter()
        .map(|u| GraphNode {
            id: u.id,
            label: u.username,
        })
        .collect();
    let edges = state
        .friends
        .accepted_edges()
        .await?
        .into_iter()
        .map(|(from, to)| GraphEdge { from, to })
        .collect();
    Ok(FriendGraph { nodes, edges })
}

pub async fn promote(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    if !state.users.set_admin(user_id, true).await? {
        return Err(ApiError::not_found("User"));
    }
    tracing::info!("Promoted {} to admin", user_id);
    require_user(state, user_id).await
}

pub async fn verify_email(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    if !state.users.set_email_verified(user_id, true).await? {
        return Err(ApiError::not_found("User"));
    }
    require_user(state, user_id).await
}

pub async fn delete_user(state: &AppState, admin: &User, user_id: Uuid) -> Result<(), ApiError> {
    if admin.id == user_id {
        return Err(ApiError::validation("You cannot delete yourself."));
    }
    if !state.users.delete_user(user_id).await? {
        return Err(ApiError::not_found("User"));
    }
    tracing::warn!("User {} deleted by {}", user_id, admin.id);
    Ok(())
}

pub async fn merge(state: &AppState, request: MergeRequest) -> Result<User, ApiError> {
    if request.source_id == request.target_id {
        return Err(ApiError::validation("Cannot merge a user into itself"));
    }
    require_user(state, request.source_id).await?;
    require_user(state, request.target_id).await?;
    let merged = state
        .merges
        .merge_users(request.source_id, request.target_id)
        .await?;
    tracing::info!("Merged {} into {}", request.source_id, request.target_id);
    Ok(merged)
}

pub async fn toggle_setting(state: &AppState, key: &str) -> Result<bool, ApiError> {
    if !KNOWN_SETTINGS.contains(&key) {
        return Err(ApiError::not_found("Setting"));
    }
    let value = state.settings.toggle(key).await?;
    tracing::info!("Setting {} is now {}", key, value);
    Ok(value)
}

pub async fn settings(state: &AppState) -> Result<BTreeMap<String, bool>, ApiError> {
    let mut values = state.settings.all().await?;
    for key in KNOWN_SETTINGS {
        values.entry(key.to_string()).or_insert(false);
    }
    Ok(values)
}

pub async fn set_announcement(
    state: &AppState,
    request: AnnouncementRequest,
) -> Result<Announcement, ApiError> {
    let text = request.text.trim();
    if request.is_active && text.is_empty() {
        return Err(ApiError::validation("Announcement text is required"));
    }
    Ok(state
        .settings
        .set_announcement(text, request.level, request.is_active)
        .await?)
}

pub async fn announcement(state: &AppState) -> Result<Option<Announcement>, ApiError> {
    Ok(state.settings.announcement().await?)
}

/// The banner every signed-in page shows, if one is switched on.
pub async fn active_announcement(state: &AppState) -> Result<Option<Announcement>, ApiError> {
    Ok(state.settings.announcement().await?.filter(|a| a.is_active))
}
