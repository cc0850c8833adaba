use serde::Deserialize;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{created, json, with_state, with_user};
use crate::error::ApiError;
use crate::services::{matches, teams};
use crate::state::AppState;
use ladder_types::{MatchSubmission, RenameTeamRequest, User};

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u64>,
    before: Option<String>,
}

/// Comma-separated player ids for each side.
#[derive(Debug, Deserialize)]
struct PredictQuery {
    team1: String,
    team2: String,
}

fn parse_ids(raw: &str) -> Result<Vec<Uuid>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s).map_err(|_| ApiError::validation(format!("Invalid player id: {s}"))))
        .collect()
}

pub fn routes(state: AppState) -> BoxedFilter<(Response,)> {
    let record = warp::path!("matches")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and(warp::body::json())
        .and_then(handle_record);

    let list = warp::path!("matches")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and(warp::query::<ListQuery>())
        .and_then(handle_list);

    let get = warp::path!("matches" / Uuid)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_get);

    let leaderboard = warp::path!("leaderboard")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_leaderboard);

    let predict = warp::path!("predict")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and(warp::query::<PredictQuery>())
        .and_then(handle_predict);

    let team = warp::path!("teams" / Uuid)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(with_user(state.clone()))
        .and_then(handle_team);

    let rename_team = warp::path!("teams" / Uuid)
        .and(warp::patch())
        .and(with_state(state.clone()))
        .and(with_user(state))
        .and(warp::body::json())
        .and_then(handle_rename_team);

    record
        .or(list)
        .unify()
        .or(get)
        .unify()
        .or(leaderboard)
        .unify()
        .or(predict)
        .unify()
        .or(team)
        .unify()
        .or(rename_team)
        .unify()
        .boxed()
}

async fn handle_record(
    state: AppState,
    user: User,
    submission: MatchSubmission,
) -> Result<Response, Rejection> {
    let recorded = matches::record_match(&state, &user, submission).await?;
    Ok(created(&recorded))
}

async fn handle_list(state: AppState, user: User, query: ListQuery) -> Result<Response, Rejection> {
    let page = matches::list_matches(&state, &user, query.limit, query.before.as_deref()).await?;
    Ok(json(&page))
}

async fn handle_get(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&matches::get_match(&state, &user, id).await?))
}

async fn handle_leaderboard(state: AppState, _user: User) -> Result<Response, Rejection> {
    Ok(json(&matches::global_leaderboard(&state).await?))
}

async fn handle_predict(
    state: AppState,
    _user: User,
    query: PredictQuery,
) -> Result<Response, Rejection> {
    let team1 = parse_ids(&query.team1)?;
    let team2 = parse_ids(&query.team2)?;
    Ok(json(&matches::predict(&state, &team1, &team2).await?))
}

async fn handle_team(id: Uuid, state: AppState, user: User) -> Result<Response, Rejection> {
    Ok(json(&teams::team_details(&state, &user, id).await?))
}

async fn handle_rename_team(
    id: Uuid,
    state: AppState,
    user: User,
    request: RenameTeamRequest,
) -> Result<Response, Rejection> {
    Ok(json(&teams::rename_team(&state, &user, id, request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(parse_ids(&format!("{a}, {b}")).unwrap(), vec![a, b]);
        assert_eq!(parse_ids("").unwrap(), Vec::<Uuid>::new());
        assert!(parse_ids("not-a-uuid").is_err());
    }
}
