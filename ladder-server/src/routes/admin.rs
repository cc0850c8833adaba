use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, no_content, with_admin, with_state};
use crate::services::admin;
use crate::state::AppState;
use ladder_types::{AnnouncementRequest, MergeRequest, User};

pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let admin_user = || with_state(state.clone()).and(with_admin(state.clone()));

    let stats = warp::path!("admin" / "stats")
        .and(warp::get())
        .and(admin_user())
        .and_then(handle_stats);

    let friend_graph = warp::path!("admin" / "friend-graph")
        .and(warp::get())
        .and(admin_user())
        .and_then(handle_friend_graph);

    let promote = warp::path!("admin" / "users" / Uuid / "promote")
        .and(warp::post())
        .and(admin_user())
        .and_then(handle_promote);

    let verify = warp::path!("admin" / "users" / Uuid / "verify")
        .and(warp::post())
        .and(admin_user())
        .and_then(handle_verify);

    let delete = warp::path!("admin" / "users" / Uuid)
        .and(warp::delete())
        .and(admin_user())
        .and_then(handle_delete);

    let merge = warp::path!("admin" / "merge")
        .and(warp::post())
        .and(admin_user())
        .and(warp::body::json())
        .and_then(handle_merge);

    let settings = warp::path!("admin" / "settings")
        .and(warp::get())
        .and(admin_user())
        .and_then(handle_settings);

    let toggle = warp::path!("admin" / "settings" / String / "toggle")
        .and(warp::post())
        .and(admin_user())
        .and_then(handle_toggle);

    let announcement = warp::path!("admin" / "announcement")
        .and(warp::get())
        .and(admin_user())
        .and_then(handle_announcement);

    let set_announcement = warp::path!("admin" / "announcement")
        .and(warp::post())
        .and(admin_user())
        .and(warp::body::json())
        .and_then(handle_set_announcement);

    stats
        .or(friend_graph)
        .unify()
        .or(promote)
        .unify()
        .or(verify)
        .unify()
        .or(delete)
        .unify()
        .or(merge)
        .unify()
        .or(settings)
        .unify()
        .or(toggle)
        .unify()
        .or(announcement)
        .unify()
        .or(set_announcement)
        .unify()
        .boxed()
}

async fn handle_stats(state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::stats(&state).await?))
}

async fn handle_friend_graph(state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::friend_graph(&state).await?))
}

async fn handle_promote(id: Uuid, state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::promote(&state, id).await?))
}

async fn handle_verify(id: Uuid, state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::verify_email(&state, id).await?))
}

async fn handle_delete(id: Uuid, state: AppState, admin_user: User) -> Result<Response, Rejection> {
    admin::delete_user(&state, &admin_user, id).await?;
    Ok(no_content())
}

async fn handle_merge(
    state: AppState,
    _admin: User,
    request: MergeRequest,
) -> Result<Response, Rejection> {
    Ok(json(&admin::merge(&state, request).await?))
}

async fn handle_settings(state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::settings(&state).await?))
}

async fn handle_toggle(key: String, state: AppState, _admin: User) -> Result<Response, Rejection> {
    let value = admin::toggle_setting(&state, &key).await?;
    Ok(json(&serde_json::json!({ "key": key, "value": value })))
}

async fn handle_announcement(state: AppState, _admin: User) -> Result<Response, Rejection> {
    Ok(json(&admin::announcement(&state).await?))
}

async fn handle_set_announcement(
    state: AppState,
    _admin: User,
    request: AnnouncementRequest,
) -> Result<Response, Rejection> {
    Ok(json(&admin::set_announcement(&state, request).await?))
}
