use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use super::{
    hash_token, load_summaries, load_users, match_views, new_token, normalize_email, require_name,
};
use crate::error::ApiError;
use crate::mailer::{EmailMessage, dispatch_group_invite};
use crate::state::AppState;
use ladder_core::{
    all_time_streaks, best_buds, group_head_to_head, group_leaderboard, is_giant_slayer,
    leaderboard_trend, summarize, team_leaderboard, team_stats,
};
use ladder_types::{
    CreateGroupRequest, Group, GroupCard, GroupDetails, GroupInvite, GroupRivalry,
    GroupUserStats, InviteEmailRequest, LeaderboardEntry, Match, Side,
    TrendData, UpdateGroupRequest, User,
};

pub const GROUP_RECENT_MATCHES: usize = 20;

pub(crate) async fn group_card(state: &AppState, group: Group) -> Result<GroupCard, ApiError> {
    let member_count = state.groups.member_count(group.id).await? as u32;
    Ok(GroupCard {
        id: group.id,
        name: group.name,
        description: group.description,
        is_public: group.is_public,
        member_count,
    })
}

async fn require_group(state: &AppState, group_id: Uuid) -> Result<Group, ApiError> {
    state
        .groups
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))
}

/// Loads a group the user may look at, with its member ids.
async fn visible_group(
    state: &AppState,
    user: &User,
    group_id: Uuid,
) -> Result<(Group, Vec<Uuid>), ApiError> {
    let group = require_group(state, group_id).await?;
    let member_ids = state.groups.member_ids(group_id).await?;
    if !group.is_public && !user.is_admin && !member_ids.contains(&user.id) {
        return Err(ApiError::forbidden("This group is private"));
    }
    Ok((group, member_ids))
}

async fn owned_group(state: &AppState, user: &User, group_id: Uuid) -> Result<Group, ApiError> {
    let group = require_group(state, group_id).await?;
    if group.owner_id != user.id {
        return Err(ApiError::forbidden("Only the group owner can do that"));
    }
    Ok(group)
}

/// Joining befriends every existing member.
async fn join_members(state: &AppState, group_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let others: Vec<Uuid> = state
        .groups
        .member_ids(group_id)
        .await?
        .into_iter()
        .filter(|id| *id != user_id)
        .collect();
    state.groups.add_member(group_id, user_id).await?;
    state.friends.befriend_many(user_id, &others).await?;
    Ok(())
}

async fn board_for(
    state: &AppState,
    member_ids: &[Uuid],
    matches: &[Match],
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let members = load_summaries(state, member_ids).await?;
    Ok(group_leaderboard(matches, &members, Utc::now()))
}

pub async fn list_groups(state: &AppState, user: &User) -> Result<Vec<GroupCard>, ApiError> {
    let groups = state.groups.groups_for_user(user.id).await?;
    let mut cards = Vec::with_capacity(groups.len());
    for group in groups {
        cards.push(group_card(state, group).await?);
    }
    Ok(cards)
}

pub async fn create_group(
    state: &AppState,
    user: &User,
    mut request: CreateGroupRequest,
) -> Result<Group, ApiError> {
    request.name = require_name(&request.name, "Group")?;
    let group = state.groups.create(user.id, &request).await?;
    tracing::info!("Group {} created by {}", group.id, user.id);
    Ok(group)
}

pub async fn group_details(
    state: &AppState,
    user: &User,
    group_id: Uuid,
) -> Result<GroupDetails, ApiError> {
    let (group, member_ids) = visible_group(state, user, group_id).await?;
    let users = load_users(state, member_ids.iter().copied().chain([group.owner_id])).await?;
    let members: Vec<_> = member_ids
        .iter()
        .filter_map(|id| users.get(id))
        .map(summarize)
        .collect();
    let is_member = member_ids.contains(&user.id);

    let matches = state.matches.for_group(group_id).await?;
    let leaderboard = group_leaderboard(&matches, &members, Utc::now());

    let recent: Vec<Match> = matches.iter().take(GROUP_RECENT_MATCHES).cloned().collect();
    let recent_matches = match_views(state, &recent, Some(user.id)).await?;
    let giant_slayer = giant_slayer(state, &recent)
        .await?
        .and_then(|id| recent_matches.iter().find(|v| v.id == id).cloned());

    let member_set: HashSet<Uuid> = member_ids.iter().copied().collect();
    // Every partnership that played here counts, including ones with a former member.
    let records = team_stats(&matches);
    let team_ids: Vec<Uuid> = records.keys().copied().collect();
    let group_teams = state.teams.find_by_ids(&team_ids).await?;
    let partners = load_users(state, group_teams.iter().flat_map(|t| t.members())).await?;
    let teams: Vec<_> = group_teams
        .into_iter()
        .map(|team| {
            let summaries: Vec<_> = team
                .members()
                .iter()
                .filter_map(|id| partners.get(id))
                .map(summarize)
                .collect();
            (team, summaries)
        })
        .collect();
    let team_leaderboard = team_leaderboard(&teams, &records);
    let best_buds = best_buds(&team_leaderboard);

    let friend_ids = state.friends.friends_of(user.id).await?;
    let eligible: Vec<Uuid> = friend_ids
        .into_iter()
        .filter(|id| !member_set.contains(id))
        .collect();
    let pending_invites = if is_member {
        state.groups.pending_invites(group_id).await?
    } else {
        Vec::new()
    };

    Ok(GroupDetails {
        owner: users.get(&group.owner_id).map(summarize),
        is_owner: group.owner_id == user.id,
        group,
        members,
        is_member,
        leaderboard,
        team_leaderboard,
        best_buds,
        recent_matches,
        giant_slayer,
        eligible_friends: load_summaries(state, &eligible).await?,
        pending_invites,
    })
}

/// Most recent match whose first-listed winner was rated well below the
/// first-listed loser.
async fn giant_slayer(state: &AppState, recent: &[Match]) -> Result<Option<Uuid>, ApiError> {
    let leads = recent
        .iter()
        .flat_map(|m| [m.team1.first(), m.team2.first()])
        .flatten()
        .copied()
        .collect::<Vec<Uuid>>();
    let users = load_users(state, leads).await?;
    let rating = |ids: &[Uuid]| ids.first().and_then(|id| users.get(id)).and_then(|u| u.dupr_rating);

    Ok(recent
        .iter()
        .find(|m| {
            let (winners, losers) = match m.winner {
                Side::Team1 => (m.team1.as_slice(), m.team2.as_slice()),
                Side::Team2 => (m.team2.as_slice(), m.team1.as_slice()),
            };
            !m.is_draw() && is_giant_slayer(rating(winners), rating(losers))
        })
        .map(|m| m.id))
}

pub async fn update_group(
    state: &AppState,
    user: &User,
    group_id: Uuid,
    mut request: UpdateGroupRequest,
) -> Result<Group, ApiError> {
    owned_group(state, user, group_id).await?;
    if let Some(name) = request.name.as_deref() {
        request.name = Some(require_name(name, "Group")?);
    }
    state
        .groups
        .update(group_id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))
}

pub async fn delete_group(state: &AppState, user: &User, group_id: Uuid) -> Result<(), ApiError> {
    owned_group(state, user, group_id).await?;
    state.groups.delete(group_id).await?;
    tracing::info!("Group {} deleted by {}", group_id, user.id);
    Ok(())
}

pub async fn join_group(state: &AppState, user: &User, group_id: Uuid) -> Result<(), ApiError> {
    let group = require_group(state, group_id).await?;
    if !group.is_public {
        return Err(ApiError::forbidden("This group is invite only"));
    }
    if state.groups.is_member(group_id, user.id).await? {
        return Err(ApiError::conflict("You are already a member of this group"));
    }
    join_members(state, group_id, user.id).await
}

pub async fn leave_group(state: &AppState, user: &User, group_id: Uuid) -> Result<(), ApiError> {
    require_group(state, group_id).await?;
    if !state.groups.remove_member(group_id, user.id).await? {
        return Err(ApiError::not_found("Membership"));
    }
    Ok(())
}

/// Adds a friend of a member straight to the group.
pub async fn invite_friend(
    state: &AppState,
    user: &User,
    group_id: Uuid,
    friend_id: Uuid,
) -> Result<(), ApiError> {
    require_group(state, group_id).await?;
    if !state.groups.is_member(group_id, user.id).await? {
        return Err(ApiError::forbidden("Only members can invite"));
    }
    if !state.friends.friends_of(user.id).await?.contains(&friend_id) {
        return Err(ApiError::validation("You can only add your friends"));
    }
    if state.groups.is_member(group_id, friend_id).await? {
        return Err(ApiError::conflict("Already a member of this group"));
    }
    join_members(state, group_id, friend_id).await
}

fn invite_message(state: &AppState, group: &Group, invite: &GroupInvite, token: &str) -> EmailMessage {
    let greeting = invite.name.as_deref().unwrap_or("there");
    EmailMessage {
        to: invite.email.clone(),
        subject: format!("Join {} on pickaladder!", group.name),
        body: format!(
            "Hi {greeting},\n\nYou have been invited to join {} on pickaladder.\n\
             Accept the invite here: {}/group-invites/{token}\n",
            group.name,
            state.config.public_base_url.trim_end_matches('/'),
        ),
    }
}

/// Emails an invite. Unknown addresses get a ghost account so matches can
/// be recorded against them before they register.
pub async fn invite_by_email(
    state: &AppState,
    user: &User,
    group_id: Uuid,
    request: InviteEmailRequest,
) -> Result<GroupInvite, ApiError> {
    let group = require_group(state, group_id).await?;
    if !state.groups.is_member(group_id, user.id).await? {
        return Err(ApiError::forbidden("Only members can invite"));
    }
    let email = normalize_email(&request.email)?;
    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    if state.users.find_by_email(&email).await?.is_none() {
        let ghost = state.users.create_ghost(&email, name.clone()).await?;
        tracing::info!("Created ghost user {} for invite", ghost.id);
    }

    let token = new_token();
    let token_hash = hash_token(&token);
    let invite = state
        .groups
        .create_invite(&token_hash, group_id, &email, name, user.id)
        .await?;

    let message = invite_message(state, &group, &invite, &token);
    dispatch_group_invite(state.mailer.clone(), state.groups.clone(), token_hash, message);
    Ok(invite)
}

/// Joins the group named by an emailed token. A ghost account created for
/// the invited address is folded into the accepting user.
pub async fn accept_invite(state: &AppState, user: &User, token: &str) -> Result<Group, ApiError> {
    let token_hash = hash_token(token);
    let invite = state
        .groups
        .find_invite(&token_hash)
        .await?
        .ok_or_else(|| ApiError::not_found("Invite"))?;
    if invite.used {
        return Err(ApiError::conflict("This invitation has already been used"));
    }
    let group = require_group(state, invite.group_id).await?;

    if let Some(ghost) = state.users.find_ghost_by_email(&invite.email).await? {
        if ghost.id != user.id {
            state.merges.merge_users(ghost.id, user.id).await?;
            tracing::info!("Merged ghost {} into {} on invite", ghost.id, user.id);
        }
    }

    if !state.groups.is_member(group.id, user.id).await? {
        join_members(state, group.id, user.id).await?;
    }
    state.groups.mark_invite_used(&token_hash).await?;
    Ok(group)
}

async fn owned_invite(
    state: &AppState,
    user: &User,
    invite_id: &str,
) -> Result<(GroupInvite, Group), ApiError> {
    let invite = state
        .groups
        .find_invite(invite_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invite"))?;
    let group = owned_group(state, user, invite.group_id).await?;
    Ok((invite, group))
}

/// Sends a pending invite again under a fresh token. The old link stops
/// working since only the hash is stored.
pub async fn resend_invite(
    state: &AppState,
    user: &User,
    invite_id: &str,
) -> Result<GroupInvite, ApiError> {
    let (invite, group) = owned_invite(state, user, invite_id).await?;
    if invite.used {
        return Err(ApiError::conflict("This invitation has already been used"));
    }

    let token = new_token();
    let token_hash = hash_token(&token);
    state.groups.delete_invite(invite_id).await?;
    let fresh = state
        .groups
        .create_invite(&token_hash, group.id, &invite.email, invite.name.clone(), invite.inviter_id)
        .await?;

    let message = invite_message(state, &group, &fresh, &token);
    dispatch_group_invite(state.mailer.clone(), state.groups.clone(), token_hash, message);
    Ok(fresh)
}

pub async fn delete_invite(state: &AppState, user: &User, invite_id: &str) -> Result<(), ApiError> {
    owned_invite(state, user, invite_id).await?;
    state.groups.delete_invite(invite_id).await?;
    Ok(())
}

pub async fn leaderboard(
    state: &AppState,
    user: &User,
    group_id: Uuid,
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    let (_, member_ids) = visible_group(state, user, group_id).await?;
    let matches = state.matches.for_group(group_id).await?;
    board_for(state, &member_ids, &matches).await
}

pub async fn trend(state: &AppState, user: &User, group_id: Uuid) -> Result<TrendData, ApiError> {
    visible_group(state, user, group_id).await?;
    let matches = state.matches.for_group(group_id).await?;
    let users = load_users(state, matches.iter().flat_map(|m| m.participants())).await?;
    let names: HashMap<Uuid, String> = users
        .values()
        .map(|u| (u.id, summarize(u).display_name))
        .collect();
    Ok(leaderboard_trend(&matches, &names))
}

pub async fn rivalry(
    state: &AppState,
    user: &User,
    group_id: Uuid,
    player_a: Uuid,
    player_b: Uuid,
) -> Result<GroupRivalry, ApiError> {
    if player_a == player_b {
        return Err(ApiError::validation("Pick two different players"));
    }
    visible_group(state, user, group_id).await?;
    let users = load_users(state, [player_a, player_b]).await?;
    let (Some(a), Some(b)) = (users.get(&player_a), users.get(&player_b)) else {
        return Err(ApiError::not_found("Player"));
    };

    let matches = state.matches.for_group(group_id).await?;
    let stats = group_head_to_head(player_a, player_b, &matches);
    let shared: Vec<Match> = matches
        .into_iter()
        .filter(|m| stats.match_ids.contains(&m.id))
        .collect();

    Ok(GroupRivalry {
        player_a: summarize(a),
        player_b: summarize(b),
        matches: match_views(state, &shared, Some(user.id)).await?,
        stats,
    })
}

pub async fn user_stats(
    state: &AppState,
    user: &User,
    group_id: Uuid,
    target: Uuid,
) -> Result<GroupUserStats, ApiError> {
    let (_, member_ids) = visible_group(state, user, group_id).await?;
    let matches = state.matches.for_group(group_id).await?;
    let board = board_for(state, &member_ids, &matches).await?;
    let (win_streak, longest_streak) = all_time_streaks(&matches, target);

    let position = board.iter().position(|e| e.user.id == target);
    let (wins, losses) = position
        .map(|i| (board[i].wins, board[i].losses))
        .unwrap_or_default();
    Ok(GroupUserStats {
        rank: position.map(|i| i as u32 + 1),
        wins,
        losses,
        win_streak,
        longest_streak,
    })
}
