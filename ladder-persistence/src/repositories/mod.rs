pub mod badge_repository;
pub mod friend_repository;
pub mod group_repository;
pub mod match_repository;
pub mod merge_repository;
pub mod settings_repository;
pub mod team_repository;
pub mod tournament_repository;
pub mod user_repository;

pub use badge_repository::BadgeRepository;
pub use friend_repository::FriendRepository;
pub use group_repository::GroupRepository;
pub use match_repository::{MatchMeta, MatchRepository};
pub use merge_repository::MergeRepository;
pub use settings_repository::SettingsRepository;
pub use team_repository::TeamRepository;
pub use tournament_repository::TournamentRepository;
pub use user_repository::{NewUser, UserRepository};
