use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Machine-readable error classification returned with every failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    RegistrationRequired,
    RateLimited,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}
