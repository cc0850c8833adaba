pub mod announcement;
pub mod badge;
pub mod errors;
pub mod group;
pub mod matches;
pub mod requests;
pub mod stats;
pub mod team;
pub mod tournament;
pub mod user;
pub mod views;

// Re-export all types
pub use announcement::*;
pub use badge::*;
pub use errors::*;
pub use group::*;
pub use matches::*;
pub use requests::*;
pub use stats::*;
pub use team::*;
pub use tournament::*;
pub use user::*;
pub use views::*;

pub type UserId = uuid::Uuid;
pub type MatchId = uuid::Uuid;
pub type GroupId = uuid::Uuid;
pub type TeamId = uuid::Uuid;
pub type TournamentId = uuid::Uuid;
