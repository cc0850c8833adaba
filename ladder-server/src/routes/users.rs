use serde::Deserialize;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{created, json, no_content, with_identity, with_state, with_user};
use crate::auth::Identity;
use crate::services::users;
use crate::state::AppState;
use ladder_types::{RegisterRequest, UpdateProfileRequest, User};

#[derive(Debug, Deserialize)]
struct CommunityQuery {
    search: Option<String>,
}

pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let register = warp::path!("auth" / "register")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_identity(state.clone()))
        .and(warp::body::json())
        .and_then(handle_register);

    let me = warp::path!("me")
        .and(warp::get())
        .and(with_user(state.clone()))
        .map(|user: User| json(&user));

    let update_me = warp::path!("me")
        .and(warp::patch())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and(warp::body::json())
        .and_then(handle_update_profile);

    let dashboard = warp::path!("dashboard")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_dashboard);

    let community = warp::path!("community")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and(warp::query::<CommunityQuery>())
        .and_then(handle_community);

    let profile = warp::path!("users" / Uuid)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_profile);

    let friend_request = warp::path!("users" / Uuid / "friend-request")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_friend_request);

    let accept_friend = warp::path!("friends" / Uuid / "accept")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_accept_friend);

    let remove_friend = warp::path!("friends" / Uuid)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_remove_friend);

    let friends = warp::path!("friends")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_friends);

    let invite_link = warp::path!("invites")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_user(state))
        .and_then(handle_invite_link);

    register
        .or(me)
        .unify()
        .or(update_me)
        .unify()
        .or(dashboard)
        .unify()
        .or(community)
        .unify()
        .or(profile)
        .unify()
        .or(friend_request)
        .unify()
        .or(accept_friend)
        .unify()
        .or(remove_friend)
        .unify()
        .or(friends)
        .unify()
        .or(invite_link)
        .unify()
        .boxed()
}

async fn handle_register(
    state: AppState,
    identity: Identity,
    request: RegisterRequest,
) -> Result<Response, Rejection> {
    let user = users::register(&state, &identity, request).await?;
    Ok(created(&user))
}

async fn handle_update_profile(
    state: AppState,
    user: User,
    request: UpdateProfileRequest,
) -> Result<Response, Rejection> {
    let updated = users::update_profile(&state, &user, request).await?;
    Ok(json(&updated))
}

async fn handle_dashboard(state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&users::dashboard(&state, &user).await?))
}

async fn handle_community(
    state: AppState,
    user: User,
    query: CommunityQuery,
) -> Result<Response, Rejection> {
    let community = users::community(&state, &user, query.search.as_deref()).await?;
    Ok(json(&community))
}

async fn handle_profile(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&users::profile(&state, &user, id).await?))
}

async fn handle_friend_request(
    id: Uuid,
    state: AppState,
    user: User,
) -> Result<Response, Rejection> {
    let friendship = users::send_friend_request(&state, &user, id).await?;
    Ok(created(&serde_json::json!({ "status": friendship })))
}

async fn handle_accept_friend(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    users::accept_friend(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_remove_friend(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    users::remove_friend(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_friends(state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&users::friends(&state, &user).await?))
}

async fn handle_invite_link(state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(created(&users::create_invite_link(&state, &user).await?))
}
