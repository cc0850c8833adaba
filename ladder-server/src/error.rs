use std::convert::Infallible;

use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::auth::AuthError;
use ladder_core::MatchValidationError;
use ladder_types::{ErrorBody, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Registration required")]
    RegistrationRequired,
    #[error("Too many requests")]
    RateLimited,
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::RegistrationRequired => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::Validation,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Conflict(_) => ErrorCode::Conflict,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::Forbidden(_) => ErrorCode::Forbidden,
            ApiError::RegistrationRequired => ErrorCode::RegistrationRequired,
            ApiError::RateLimited => ErrorCode::RateLimited,
            ApiError::Internal(_) => ErrorCode::Internal,
        }
    }

    fn body(&self) -> ErrorBody {
        let error = match self {
            // Internal details stay in the logs.
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            error,
            code: self.code(),
        }
    }
}

impl warp::reject::Reject for ApiError {}

impl From<MatchValidationError> for ApiError {
    fn from(err: MatchValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

fn reply(status: StatusCode, body: &ErrorBody) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

/// Renders every rejection as an `ErrorBody`.
pub async fn recover(rejection: Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(err) = rejection.find::<ApiError>() {
        if let ApiError::Internal(source) = err {
            tracing::error!("Request failed: {:#}", source);
        }
        return Ok(reply(err.status(), &err.body()));
    }

    let (status, code, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, ErrorCode::Validation, err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, ErrorCode::Validation, err.to_string())
    } else if rejection.find::<warp::reject::MissingHeader>().is_some() {
        (
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Authentication required".to_string(),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::Validation,
            "Method not allowed".to_string(),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Internal server error".to_string(),
        )
    };

    Ok(reply(status, &ErrorBody { error: message, code }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("Group").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("taken").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::RegistrationRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let body = ApiError::Internal(anyhow::anyhow!("connection refused")).body();
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.code, ErrorCode::Internal);

        let body = ApiError::not_found("Tournament").body();
        assert_eq!(body.error, "Tournament not found");
    }

    #[test]
    fn test_match_validation_maps_to_bad_request() {
        let err: ApiError = MatchValidationError::TiedScore.into();
        assert_eq!(err.code(), ErrorCode::Validation);
    }
}
