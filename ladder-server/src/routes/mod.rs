//! HTTP surface. Each area builds a boxed filter; `create_routes` joins
//! them and attaches CORS, request logging and the error renderer.

use std::convert::Infallible;

use serde::Serialize;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::auth::{Identity, bearer_token};
use crate::error::{ApiError, recover};
use crate::services::admin::ENFORCE_EMAIL_VERIFICATION;
use crate::state::AppState;
use ladder_types::User;

mod admin;
mod groups;
mod matches;
mod tournaments;
mod users;

pub fn create_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK).into_response());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE"]);

    health
        .or(users::routes(state.clone()))
        .unify()
        .or(matches::routes(state.clone()))
        .unify()
        .or(groups::routes(state.clone()))
        .unify()
        .or(tournaments::routes(state.clone()))
        .unify()
        .or(admin::routes(state))
        .unify()
        .recover(recover)
        .unify()
        .with(cors)
        .with(warp::log("pickaladder"))
        .map(|reply| Reply::into_response(reply))
        .boxed()
}

pub(crate) fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// The caller as vouched for by the identity provider.
pub(crate) fn with_identity(
    state: AppState,
) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    warp::header::<String>("authorization")
        .and(with_state(state))
        .and_then(|header: String, state: AppState| async move {
            state
                .auth
                .validate_token(bearer_token(&header))
                .await
                .map_err(|err| Rejection::from(ApiError::from(err)))
        })
}

async fn resolve_user(state: AppState, identity: Identity) -> Result<User, Rejection> {
    let user = state
        .users
        .find_by_auth_uid(&identity.uid)
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::RegistrationRequired)?;

    if !user.email_verified && !identity.email_verified {
        let enforced = state
            .settings
            .get(ENFORCE_EMAIL_VERIFICATION)
            .await
            .map_err(ApiError::from)?;
        if enforced {
            return Err(ApiError::forbidden("Please verify your email address").into());
        }
    }
    Ok(user)
}

/// A registered user. Unregistered identities are told to register.
pub(crate) fn with_user(state: AppState) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    with_state(state.clone())
        .and(with_identity(state))
        .and_then(resolve_user)
}

pub(crate) fn with_admin(state: AppState) -> impl Filter<Extract = (User,), Error = Rejection> + Clone {
    with_user(state).and_then(|user: User| async move {
        if user.is_admin {
            Ok(user)
        } else {
            Err(Rejection::from(ApiError::forbidden("Admin access required")))
        }
    })
}

pub(crate) fn json<T: Serialize>(value: &T) -> Response {
    warp::reply::json(value).into_response()
}

pub(crate) fn created<T: Serialize>(value: &T) -> Response {
    warp::reply::with_status(warp::reply::json(value), StatusCode::CREATED).into_response()
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
