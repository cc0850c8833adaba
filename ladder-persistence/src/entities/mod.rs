pub mod prelude;

pub mod announcements;
pub mod friend_invites;
pub mod friendships;
pub mod group_invites;
pub mod group_members;
pub mod groups;
pub mod matches;
pub mod settings;
pub mod teams;
pub mod tournament_participants;
pub mod tournaments;
pub mod user_badges;
pub mod users;
