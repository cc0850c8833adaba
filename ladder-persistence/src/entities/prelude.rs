pub use super::announcements::Entity as Announcements;
pub use super::friend_invites::Entity as FriendInvites;
pub use super::friendships::Entity as Friendships;
pub use super::group_invites::Entity as GroupInvites;
pub use super::group_members::Entity as GroupMembers;
pub use super::groups::Entity as Groups;
pub use super::matches::Entity as Matches;
pub use super::settings::Entity as Settings;
pub use super::teams::Entity as Teams;
pub use super::tournament_participants::Entity as TournamentParticipants;
pub use super::tournaments::Entity as Tournaments;
pub use super::user_badges::Entity as UserBadges;
pub use super::users::Entity as Users;
