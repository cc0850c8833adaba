use serde::Deserialize;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{created, json, no_content, with_state, with_user};
use crate::services::groups;
use crate::state::AppState;
use ladder_types::{
    CreateGroupRequest, InviteEmailRequest, InviteFriendRequest, UpdateGroupRequest, User,
};

#[derive(Debug, Deserialize)]
struct RivalryQuery {
    player_a: Uuid,
    player_b: Uuid,
}

pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let user = || with_state(state.clone()).and(with_user(state.clone()));

    let list = warp::path!("groups")
        .and(warp::get())
        .and(user())
        .and_then(handle_list);

    let create = warp::path!("groups")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_create);

    let details = warp::path!("groups" / Uuid)
        .and(warp::get())
        .and(user())
        .and_then(handle_details);

    let update = warp::path!("groups" / Uuid)
        .and(warp::patch())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_update);

    let delete = warp::path!("groups" / Uuid)
        .and(warp::delete())
        .and(user())
        .and_then(handle_delete);

    let join = warp::path!("groups" / Uuid / "join")
        .and(warp::post())
        .and(user())
        .and_then(handle_join);

    let leave = warp::path!("groups" / Uuid / "leave")
        .and(warp::post())
        .and(user())
        .and_then(handle_leave);

    let invite_friend = warp::path!("groups" / Uuid / "invite-friend")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_invite_friend);

    let invite_email = warp::path!("groups" / Uuid / "invite-email")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_invite_email);

    let leaderboard = warp::path!("groups" / Uuid / "leaderboard")
        .and(warp::get())
        .and(user())
        .and_then(handle_leaderboard);

    let trend = warp::path!("groups" / Uuid / "trend")
        .and(warp::get())
        .and(user())
        .and_then(handle_trend);

    let rivalry = warp::path!("groups" / Uuid / "rivalry")
        .and(warp::get())
        .and(user())
        .and(warp::query::<RivalryQuery>())
        .and_then(handle_rivalry);

    let user_stats = warp::path!("groups" / Uuid / "stats" / Uuid)
        .and(warp::get())
        .and(user())
        .and_then(handle_user_stats);

    let accept_invite = warp::path!("group-invites" / String / "accept")
        .and(warp::post())
        .and(user())
        .and_then(handle_accept_invite);

    let resend_invite = warp::path!("group-invites" / String / "resend")
        .and(warp::post())
        .and(user())
        .and_then(handle_resend_invite);

    let delete_invite = warp::path!("group-invites" / String)
        .and(warp::delete())
        .and(user())
        .and_then(handle_delete_invite);

    list.or(create)
        .unify()
        .or(details)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(join)
        .unify()
        .or(leave)
        .unify()
        .or(invite_friend)
        .unify()
        .or(invite_email)
        .unify()
        .or(leaderboard)
        .unify()
        .or(trend)
        .unify()
        .or(rivalry)
        .unify()
        .or(user_stats)
        .unify()
        .or(accept_invite)
        .unify()
        .or(resend_invite)
        .unify()
        .or(delete_invite)
        .unify()
        .boxed()
}

async fn handle_list(state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::list_groups(&state, &user).await?))
}

async fn handle_create(
    state: AppState,
    user: User,
    request: CreateGroupRequest,
) -> Result<Response, Rejection> {
    Ok(created(&groups::create_group(&state, &user, request).await?))
}

async fn handle_details(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::group_details(&state, &user, id).await?))
}

async fn handle_update(
    id: Uuid,
    state: AppState,
    user: User,
    request: UpdateGroupRequest,
) -> Result<Response, Rejection> {
    Ok(json(&groups::update_group(&state, &user, id, request).await?))
}

async fn handle_delete(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    groups::delete_group(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_join(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    groups::join_group(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_leave(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    groups::leave_group(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_invite_friend(
    id: Uuid,
    state: AppState,
    user: User,
    request: InviteFriendRequest,
) -> Result<Response, Rejection> {
    groups::invite_friend(&state, &user, id, request.friend_id).await?;
    Ok(no_content())
}

async fn handle_invite_email(
    id: Uuid,
    state: AppState,
    user: User,
    request: InviteEmailRequest,
) -> Result<Response, Rejection> {
    Ok(created(&groups::invite_by_email(&state, &user, id, request).await?))
}

async fn handle_leaderboard(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::leaderboard(&state, &user, id).await?))
}

async fn handle_trend(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::trend(&state, &user, id).await?))
}

async fn handle_rivalry(
    id: Uuid,
    state: AppState,
    user: User,
    query: RivalryQuery,
) -> Result<Response, Rejection> {
    let rivalry = groups::rivalry(&state, &user, id, query.player_a, query.player_b).await?;
    Ok(json(&rivalry))
}

async fn handle_user_stats(
    id: Uuid,
    target: Uuid,
    state: AppState,
    user: User,
) -> Result<Response, Rejection> {
    Ok(json(&groups::user_stats(&state, &user, id, target).await?))
}

async fn handle_accept_invite(token: String, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::accept_invite(&state, &user, &token).await?))
}

async fn handle_resend_invite(id: String, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&groups::resend_invite(&state, &user, &id).await?))
}

async fn handle_delete_invite(id: String, state: AppState, user: User) -> Result<Response, Rejection> {
    groups::delete_invite(&state, &user, &id).await?;
    Ok(no_content())
}
