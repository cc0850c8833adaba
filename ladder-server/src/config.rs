use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth_dev_mode: bool,
    pub auth_project_id: String,
    pub public_base_url: String,
    pub global_leaderboard_min_games: u32,
    pub match_rate_limit_burst: u32,
    pub match_rate_limit_refill_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://pickaladder.db?mode=rwc".to_string()),
            auth_dev_mode: env::var("AUTH_DEV_MODE").unwrap_or_else(|_| "false".to_string())
                == "true",
            auth_project_id: env::var("AUTH_PROJECT_ID")
                .unwrap_or_else(|_| "pickaladder".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            global_leaderboard_min_games: env::var("GLOBAL_LEADERBOARD_MIN_GAMES")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .expect("Invalid GLOBAL_LEADERBOARD_MIN_GAMES"),
            match_rate_limit_burst: env::var("MATCH_RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("Invalid MATCH_RATE_LIMIT_BURST"),
            match_rate_limit_refill_seconds: env::var("MATCH_RATE_LIMIT_REFILL_SECONDS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("Invalid MATCH_RATE_LIMIT_REFILL_SECONDS"),
        }
    }

    /// Settings suited to tests: dev-mode auth and no environment lookups.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            auth_dev_mode: true,
            auth_project_id: "test-project".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            global_leaderboard_min_games: 1,
            match_rate_limit_burst: 20,
            match_rate_limit_refill_seconds: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
