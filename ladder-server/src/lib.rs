pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod rate_limiter;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_routes;
pub use state::AppState;
