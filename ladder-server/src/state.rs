use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::config::Config;
use crate::mailer::Mailer;
use crate::rate_limiter::UserRateLimits;
use ladder_persistence::{
    BadgeRepository, FriendRepository, GroupRepository, MatchRepository, MergeRepository,
    SettingsRepository, TeamRepository, TournamentRepository, UserRepository,
};

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub mailer: Arc<dyn Mailer>,
    pub match_limits: Arc<UserRateLimits>,
    pub users: Arc<UserRepository>,
    pub friends: Arc<FriendRepository>,
    pub teams: Arc<TeamRepository>,
    pub matches: Arc<MatchRepository>,
    pub groups: Arc<GroupRepository>,
    pub tournaments: Arc<TournamentRepository>,
    pub badges: Arc<BadgeRepository>,
    pub settings: Arc<SettingsRepository>,
    pub merges: Arc<MergeRepository>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        auth: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let match_limits = Arc::new(UserRateLimits::new(
            config.match_rate_limit_burst,
            Duration::from_secs(config.match_rate_limit_refill_seconds),
        ));
        Self {
            config: Arc::new(config),
            auth,
            mailer,
            match_limits,
            users: Arc::new(UserRepository::new(db.clone())),
            friends: Arc::new(FriendRepository::new(db.clone())),
            teams: Arc::new(TeamRepository::new(db.clone())),
            matches: Arc::new(MatchRepository::new(db.clone())),
            groups: Arc::new(GroupRepository::new(db.clone())),
            tournaments: Arc::new(TournamentRepository::new(db.clone())),
            badges: Arc::new(BadgeRepository::new(db.clone())),
            settings: Arc::new(SettingsRepository::new(db.clone())),
            merges: Arc::new(MergeRepository::new(db)),
        }
    }
}
