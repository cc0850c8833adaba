use chrono::Utc;
use futures_util::future::try_join_all;
use uuid::Uuid;

use super::{load_summaries, match_views, normalize_email, require_user, validate_username};
use crate::auth::Identity;
use crate::error::ApiError;
use crate::services::admin;
use crate::services::groups::group_card;
use crate::services::tournaments::winner_name;
use crate::state::AppState;
use ladder_core::{
    RECENT_OPPONENTS_LIMIT, calculate_stats, group_leaderboard, head_to_head, onboarding_progress,
    rank_in, recent_opponents, summarize,
};
use ladder_persistence::NewUser;
use ladder_types::{
    Community, Dashboard, FriendInviteLink, FriendshipState, GroupRanking,
    ParticipantStatus, PastTournament, Profile, RegisterRequest, TournamentStatus,
    UpdateProfileRequest, User, UserSummary,
};

pub const DASHBOARD_MATCH_LIMIT: usize = 20;
pub const PROFILE_MATCH_LIMIT: usize = 10;
pub const COMMUNITY_LIST_LIMIT: u64 = 20;
pub const MAX_DUPR_RATING: f64 = 8.0;

/// Creates the profile for a freshly authenticated identity. A ghost
/// account invited under the same email is folded into the new user, and
/// a referral token befriends the inviter.
pub async fn register(
    state: &AppState,
    identity: &Identity,
    request: RegisterRequest,
) -> Result<User, ApiError> {
    if state.users.find_by_auth_uid(&identity.uid).await?.is_some() {
        return Err(ApiError::conflict("Already registered"));
    }

    let username = request.username.trim().to_string();
    validate_username(&username)?;
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(ApiError::conflict(
            "Username already exists. Please choose a different one.",
        ));
    }

    let email = request
        .email
        .as_deref()
        .or(identity.email.as_deref())
        .ok_or_else(|| ApiError::validation("Email is required"))
        .and_then(normalize_email)?;
    validate_dupr(request.dupr_rating)?;

    let ghost = state.users.find_ghost_by_email(&email).await?;
    if ghost.is_none() && state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email address is already registered."));
    }

    let mut user = state
        .users
        .create_user(NewUser {
            auth_uid: Some(identity.uid.clone()),
            username,
            email: Some(email),
            name: request
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .or_else(|| identity.name.clone()),
            dupr_rating: request.dupr_rating,
            is_ghost: false,
            email_verified: identity.email_verified,
        })
        .await?;
    tracing::info!("Registered user {} ({})", user.username, user.id);

    if let Some(ghost) = ghost {
        user = state.merges.merge_users(ghost.id, user.id).await?;
        tracing::info!("Merged ghost account {} into {}", ghost.id, user.id);
    }

    if let Some(token) = request.invite_token.as_deref() {
        match state.friends.find_invite(token).await? {
            Some(invite) if !invite.used && invite.inviter_id != user.id => {
                state.friends.befriend(invite.inviter_id, user.id).await?;
                state.friends.mark_invite_used(token).await?;
            }
            Some(_) => tracing::debug!("Ignoring used invite token"),
            None => tracing::debug!("Ignoring unknown invite token"),
        }
    }

    Ok(user)
}

fn validate_dupr(rating: Option<f64>) -> Result<(), ApiError> {
    match rating {
        Some(r) if !(0.0..=MAX_DUPR_RATING).contains(&r) => Err(ApiError::validation(format!(
            "DUPR rating must be between 0 and {MAX_DUPR_RATING}"
        ))),
        _ => Ok(()),
    }
}

pub async fn update_profile(
    state: &AppState,
    user: &User,
    request: UpdateProfileRequest,
) -> Result<User, ApiError> {
    validate_dupr(request.dupr_rating)?;
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("Name cannot be empty"));
    }
    Ok(state.users.update_profile(user.id, &request).await?)
}

async fn group_rankings(state: &AppState, user: &User) -> Result<Vec<GroupRanking>, ApiError> {
    let groups = state.groups.groups_for_user(user.id).await?;
    let now = Utc::now();
    let rankings = groups.iter().map(|group| async move {
        let member_ids = state.groups.member_ids(group.id).await?;
        let members = load_summaries(state, &member_ids).await?;
        let matches = state.matches.for_group(group.id).await?;
        let board = group_leaderboard(&matches, &members, now);
        Ok::<_, ApiError>(rank_in(&board, user.id, group.id, &group.name))
    });
    try_join_all(rankings).await
}

pub async fn dashboard(state: &AppState, user: &User) -> Result<Dashboard, ApiError> {
    let matches = state.matches.all_for_user(user.id).await?;
    let stats = calculate_stats(&matches, user.id);

    let recent: Vec<_> = matches.iter().take(DASHBOARD_MATCH_LIMIT).cloned().collect();
    let match_list = match_views(state, &recent, Some(user.id)).await?;

    let opponent_ids = recent_opponents(&matches, user.id, RECENT_OPPONENTS_LIMIT);
    let opponents = load_summaries(state, &opponent_ids).await?;

    let friend_ids = state.friends.friends_of(user.id).await?;
    let friends = load_summaries(state, &friend_ids).await?;
    let request_ids = state.friends.incoming_requests(user.id).await?;
    let requests = load_summaries(state, &request_ids).await?;

    let group_rankings = group_rankings(state, user).await?;

    let mut tournament_invites = Vec::new();
    let mut active_tournaments = Vec::new();
    let mut past_tournaments = Vec::new();
    for (tournament, status) in state.tournaments.for_user(user.id).await? {
        match (status, tournament.status) {
            (ParticipantStatus::Pending, _) => tournament_invites.push(tournament),
            (ParticipantStatus::Accepted, TournamentStatus::Active) => {
                active_tournaments.push(tournament)
            }
            (ParticipantStatus::Accepted, TournamentStatus::Completed) => {
                let winner_name = winner_name(state, &tournament).await?;
                past_tournaments.push(PastTournament {
                    tournament,
                    winner_name,
                });
            }
        }
    }

    let badges = state.badges.badges_for(user.id).await?;
    let onboarding = onboarding_progress(
        user.profile_picture_url.is_some(),
        user.dupr_rating.is_some_and(|r| r > 0.0),
        !group_rankings.is_empty(),
        !matches.is_empty(),
        !friend_ids.is_empty(),
    );

    Ok(Dashboard {
        user: user.clone(),
        stats,
        matches: match_list,
        recent_opponents: opponents,
        friends,
        requests,
        group_rankings,
        tournament_invites,
        active_tournaments,
        past_tournaments,
        badges,
        onboarding,
        announcement: admin::active_announcement(state).await?,
    })
}

pub async fn community(
    state: &AppState,
    user: &User,
    search: Option<&str>,
) -> Result<Community, ApiError> {
    let friend_ids = state.friends.friends_of(user.id).await?;
    let incoming_ids = state.friends.incoming_requests(user.id).await?;
    let outgoing_ids = state.friends.outgoing_requests(user.id).await?;

    let mut exclude = vec![user.id];
    exclude.extend(&friend_ids);
    exclude.extend(&incoming_ids);
    exclude.extend(&outgoing_ids);

    let term = search.map(str::trim).filter(|t| !t.is_empty());
    let others = match term {
        Some(term) => state.users.search(term, &exclude, COMMUNITY_LIST_LIMIT).await?,
        None => state.users.list_users(&exclude, COMMUNITY_LIST_LIMIT).await?,
    };
    let groups = match term {
        Some(term) => state.groups.search_public(term, COMMUNITY_LIST_LIMIT).await?,
        None => state.groups.public_groups(COMMUNITY_LIST_LIMIT).await?,
    };

    let mut public_groups = Vec::with_capacity(groups.len());
    for group in groups {
        public_groups.push(group_card(state, group).await?);
    }

    let tournament_invites = state
        .tournaments
        .for_user(user.id)
        .await?
        .into_iter()
        .filter(|(_, status)| *status == ParticipantStatus::Pending)
        .map(|(t, _)| t)
        .collect();

    Ok(Community {
        friends: load_summaries(state, &friend_ids).await?,
        incoming_requests: load_summaries(state, &incoming_ids).await?,
        outgoing_requests: load_summaries(state, &outgoing_ids).await?,
        all_users: others
            .iter()
            .filter(|u| !u.is_ghost)
            .map(summarize)
            .collect(),
        public_groups,
        tournament_invites,
    })
}

pub async fn profile(state: &AppState, viewer: &User, user_id: Uuid) -> Result<Profile, ApiError> {
    let user = require_user(state, user_id).await?;
    let matches = state.matches.all_for_user(user.id).await?;
    let friendship = if viewer.id == user.id {
        FriendshipState::None
    } else {
        state.friends.status_between(viewer.id, user.id).await?
    };
    let head_to_head = if viewer.id == user.id {
        None
    } else {
        head_to_head(&matches, viewer.id, user.id)
    };
    let friend_ids = state.friends.friends_of(user.id).await?;
    let recent: Vec<_> = matches.iter().take(PROFILE_MATCH_LIMIT).cloned().collect();

    Ok(Profile {
        user: summarize(&user),
        friendship,
        stats: calculate_stats(&matches, user.id),
        head_to_head,
        friends: load_summaries(state, &friend_ids).await?,
        matches: match_views(state, &recent, Some(user.id)).await?,
        badges: state.badges.badges_for(user.id).await?,
    })
}

pub async fn send_friend_request(
    state: &AppState,
    user: &User,
    target_id: Uuid,
) -> Result<FriendshipState, ApiError> {
    if target_id == user.id {
        return Err(ApiError::validation("You cannot add yourself as a friend."));
    }
    require_user(state, target_id).await?;
    if !state.friends.send_request(user.id, target_id).await? {
        return Err(ApiError::conflict("Friend request already sent or accepted."));
    }
    tracing::info!("Friend request from {} to {}", user.id, target_id);
    Ok(state.friends.status_between(user.id, target_id).await?)
}

pub async fn accept_friend(state: &AppState, user: &User, requester: Uuid) -> Result<(), ApiError> {
    if !state.friends.accept(user.id, requester).await? {
        return Err(ApiError::not_found("Friend request"));
    }
    Ok(())
}

/// Removes a friend or withdraws/declines a pending request.
pub async fn remove_friend(state: &AppState, user: &User, other: Uuid) -> Result<(), ApiError> {
    if !state.friends.remove(user.id, other).await? {
        return Err(ApiError::not_found("Friendship"));
    }
    Ok(())
}

pub async fn friends(state: &AppState, user: &User) -> Result<Vec<UserSummary>, ApiError> {
    let ids = state.friends.friends_of(user.id).await?;
    load_summaries(state, &ids).await
}

pub async fn create_invite_link(
    state: &AppState,
    user: &User,
) -> Result<FriendInviteLink, ApiError> {
    let token = super::new_token();
    state.friends.create_invite(user.id, &token).await?;
    Ok(FriendInviteLink {
        url: format!(
            "{}/register?invite_token={}",
            state.config.public_base_url.trim_end_matches('/'),
            token
        ),
        token,
    })
}
