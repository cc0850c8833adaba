use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{created, json, no_content, with_state, with_user};
use crate::services::tournaments;
use crate::state::AppState;
use ladder_types::{
    CreateTournamentRequest, InviteGroupRequest, InvitePlayerRequest, TeamNameRequest,
    UpdateTournamentRequest, User,
};

pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let user = || with_state(state.clone()).and(with_user(state.clone()));

    let list = warp::path!("tournaments")
        .and(warp::get())
        .and(user())
        .and_then(handle_list);

    let create = warp::path!("tournaments")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_create);

    let details = warp::path!("tournaments" / Uuid)
        .and(warp::get())
        .and(user())
        .and_then(handle_details);

    let update = warp::path!("tournaments" / Uuid)
        .and(warp::patch())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_update);

    let invite = warp::path!("tournaments" / Uuid / "invite")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_invite);

    let invite_group = warp::path!("tournaments" / Uuid / "invite-group")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_invite_group);

    let accept = warp::path!("tournaments" / Uuid / "accept")
        .and(warp::post())
        .and(user())
        .and_then(handle_accept);

    let decline = warp::path!("tournaments" / Uuid / "decline")
        .and(warp::post())
        .and(user())
        .and_then(handle_decline);

    let team_name = warp::path!("tournaments" / Uuid / "team-name")
        .and(warp::post())
        .and(user())
        .and(warp::body::json())
        .and_then(handle_team_name);

    let complete = warp::path!("tournaments" / Uuid / "complete")
        .and(warp::post())
        .and(user())
        .and_then(handle_complete);

    let standings = warp::path!("tournaments" / Uuid / "standings")
        .and(warp::get())
        .and(user())
        .and_then(handle_standings);

    list.or(create)
        .unify()
        .or(details)
        .unify()
        .or(update)
        .unify()
        .or(invite)
        .unify()
        .or(invite_group)
        .unify()
        .or(accept)
        .unify()
        .or(decline)
        .unify()
        .or(team_name)
        .unify()
        .or(complete)
        .unify()
        .or(standings)
        .unify()
        .boxed()
}

async fn handle_list(state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&tournaments::list_tournaments(&state, &user).await?))
}

async fn handle_create(
    state: AppState,
    user: User,
    request: CreateTournamentRequest,
) -> Result<Response, Rejection> {
    Ok(created(&tournaments::create_tournament(&state, &user, request).await?))
}

async fn handle_details(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&tournaments::tournament_details(&state, &user, id).await?))
}

async fn handle_update(
    id: Uuid,
    state: AppState,
    user: User,
    request: UpdateTournamentRequest,
) -> Result<Response, Rejection> {
    Ok(json(&tournaments::update_tournament(&state, &user, id, request).await?))
}

async fn handle_invite(
    id: Uuid,
    state: AppState,
    user: User,
    request: InvitePlayerRequest,
) -> Result<Response, Rejection> {
    tournaments::invite_player(&state, &user, id, request.user_id).await?;
    Ok(no_content())
}

async fn handle_invite_group(
    id: Uuid,
    state: AppState,
    user: User,
    request: InviteGroupRequest,
) -> Result<Response, Rejection> {
    let invited = tournaments::invite_group(&state, &user, id, request.group_id).await?;
    Ok(json(&serde_json::json!({ "invited": invited })))
}

async fn handle_accept(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    tournaments::accept_invite(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_decline(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    tournaments::decline_invite(&state, &user, id).await?;
    Ok(no_content())
}

async fn handle_team_name(
    id: Uuid,
    state: AppState,
    user: User,
    request: TeamNameRequest,
) -> Result<Response, Rejection> {
    tournaments::set_team_name(&state, &user, id, &request.team_name).await?;
    Ok(no_content())
}

async fn handle_complete(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&tournaments::complete_tournament(&state, &user, id).await?))
}

async fn handle_standings(id: Uuid, state: AppState, _user: User) -> Result<Response, Rejection> {
    Ok(json(&tournaments::tournament_standings_for(&state, id).await?))
}
