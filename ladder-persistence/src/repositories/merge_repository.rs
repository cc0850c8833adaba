use anyhow::{bail, Result};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    friend_invites, friendships, group_invites, group_members, groups, matches, prelude::*,
    teams, tournament_participants, tournaments, user_badges, users,
};
use crate::repositories::team_repository::{find_pair, sorted_pair};
use crate::repositories::user_repository::UserRepository;
use ladder_types::{ParticipantStatus, User};

/// Folds one account into another, used when a ghost invitee signs up or
/// an admin merges duplicate accounts.
pub struct MergeRepository {
    db: DatabaseConnection,
}

impl MergeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves everything owned by `source` onto `target` and deletes
    /// `source`. Runs in one transaction.
    pub async fn merge_users(&self, source_id: Uuid, target_id: Uuid) -> Result<User> {
        if source_id == target_id {
            bail!("Cannot merge a user into itself");
        }

        let txn = self.db.begin().await?;
        let Some(source) = Users::find_by_id(source_id).one(&txn).await? else {
            bail!("Source user {} not found", source_id);
        };
        let Some(target) = Users::find_by_id(target_id).one(&txn).await? else {
            bail!("Target user {} not found", target_id);
        };

        repoint_matches(&txn, source_id, target_id).await?;
        merge_teams(&txn, source_id, target_id).await?;
        merge_memberships(&txn, source_id, target_id).await?;
        merge_participants(&txn, source_id, target_id).await?;
        merge_friendships(&txn, source_id, target_id).await?;
        merge_badges(&txn, source_id, target_id).await?;

        Groups::update_many()
            .col_expr(groups::Column::OwnerId, Expr::value(target_id))
            .filter(groups::Column::OwnerId.eq(source_id))
            .exec(&txn)
            .await?;
        Tournaments::update_many()
            .col_expr(tournaments::Column::OrganizerId, Expr::value(target_id))
            .filter(tournaments::Column::OrganizerId.eq(source_id))
            .exec(&txn)
            .await?;
        FriendInvites::update_many()
            .col_expr(friend_invites::Column::InviterId, Expr::value(target_id))
            .filter(friend_invites::Column::InviterId.eq(source_id))
            .exec(&txn)
            .await?;
        GroupInvites::update_many()
            .col_expr(group_invites::Column::InviterId, Expr::value(target_id))
            .filter(group_invites::Column::InviterId.eq(source_id))
            .exec(&txn)
            .await?;

        let (source_wins, source_losses) = (source.wins, source.losses);
        let (target_wins, target_losses) = (target.wins, target.losses);
        let mut active: users::ActiveModel = target.into();
        active.wins = ActiveValue::Set(target_wins + source_wins);
        active.losses = ActiveValue::Set(target_losses + source_losses);
        active.updated_at = ActiveValue::Set(chrono::Utc::now());
        let merged = active.update(&txn).await?;

        Users::delete_by_id(source_id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Merged user {} into {}", source_id, target_id);
        Ok(UserRepository::model_to_user(merged))
    }
}

async fn repoint_matches<C: ConnectionTrait>(conn: &C, from: Uuid, to: Uuid) -> Result<()> {
    for column in [
        matches::Column::Team1Player1Id,
        matches::Column::Team1Player2Id,
        matches::Column::Team2Player1Id,
        matches::Column::Team2Player2Id,
        matches::Column::RecordedBy,
    ] {
        Matches::update_many()
            .col_expr(column, Expr::value(to))
            .filter(column.eq(from))
            .exec(conn)
            .await?;
    }
    Ok(())
}

async fn repoint_team<C: ConnectionTrait>(conn: &C, from: Uuid, to: Option<Uuid>) -> Result<()> {
    for column in [matches::Column::Team1Id, matches::Column::Team2Id] {
        Matches::update_many()
            .col_expr(column, Expr::value(to))
            .filter(column.eq(from))
            .exec(conn)
            .await?;
    }
    Ok(())
}

/// Re-keys each of the source's teams onto the target. A pairing that
/// already exists for the target absorbs the old team's record.
async fn merge_teams<C: ConnectionTrait>(conn: &C, source: Uuid, target: Uuid) -> Result<()> {
    let owned = Teams::find()
        .filter(
            sea_orm::Condition::any()
                .add(teams::Column::PlayerAId.eq(source))
                .add(teams::Column::PlayerBId.eq(source)),
        )
        .all(conn)
        .await?;

    for team in owned {
        let partner = if team.player_a_id == source {
            team.player_b_id
        } else {
            team.player_a_id
        };

        if partner == target {
            repoint_team(conn, team.id, None).await?;
            Teams::delete_by_id(team.id).exec(conn).await?;
            continue;
        }

        match find_pair(conn, target, partner).await? {
            Some(existing) => {
                let (wins, losses) = (existing.wins + team.wins, existing.losses + team.losses);
                let mut active: teams::ActiveModel = existing.clone().into();
                active.wins = ActiveValue::Set(wins);
                active.losses = ActiveValue::Set(losses);
                active.update(conn).await?;
                repoint_team(conn, team.id, Some(existing.id)).await?;
                Teams::delete_by_id(team.id).exec(conn).await?;
            }
            None => {
                let (first, second) = sorted_pair(target, partner);
                let mut active: teams::ActiveModel = team.into();
                active.player_a_id = ActiveValue::Set(first);
                active.player_b_id = ActiveValue::Set(second);
                active.update(conn).await?;
            }
        }
    }
    Ok(())
}

async fn merge_memberships<C: ConnectionTrait>(conn: &C, source: Uuid, target: Uuid) -> Result<()> {
    let rows = GroupMembers::find()
        .filter(group_members::Column::UserId.eq(source))
        .all(conn)
        .await?;
    if !rows.is_empty() {
        let moved = rows.into_iter().map(|row| group_members::ActiveModel {
            group_id: ActiveValue::Set(row.group_id),
            user_id: ActiveValue::Set(target),
            joined_at: ActiveValue::Set(row.joined_at),
        });
        GroupMembers::insert_many(moved)
            .on_conflict(
                OnConflict::columns([group_members::Column::GroupId, group_members::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }
    GroupMembers::delete_many()
        .filter(group_members::Column::UserId.eq(source))
        .exec(conn)
        .await?;
    Ok(())
}

/// An accepted entry wins over a pending one when both accounts were
/// invited to the same tournament.
async fn merge_participants<C: ConnectionTrait>(conn: &C, source: Uuid, target: Uuid) -> Result<()> {
    let rows = TournamentParticipants::find()
        .filter(tournament_participants::Column::UserId.eq(source))
        .all(conn)
        .await?;
    let accepted = ParticipantStatus::Accepted.as_str();

    for row in rows {
        let existing = TournamentParticipants::find_by_id((row.tournament_id, target))
            .one(conn)
            .await?;
        match existing {
            Some(current) => {
                if row.status == accepted && current.status != accepted {
                    let mut active: tournament_participants::ActiveModel = current.into();
                    active.status = ActiveValue::Set(accepted.to_string());
                    active.update(conn).await?;
                }
            }
            None => {
                TournamentParticipants::insert(tournament_participants::ActiveModel {
                    tournament_id: ActiveValue::Set(row.tournament_id),
                    user_id: ActiveValue::Set(target),
                    status: ActiveValue::Set(row.status.clone()),
                    team_name: ActiveValue::Set(row.team_name.clone()),
                    email: ActiveValue::Set(row.email.clone()),
                    invited_at: ActiveValue::Set(row.invited_at),
                })
                .exec_without_returning(conn)
                .await?;
            }
        }
    }
    TournamentParticipants::delete_many()
        .filter(tournament_participants::Column::UserId.eq(source))
        .exec(conn)
        .await?;
    Ok(())
}

async fn merge_friendships<C: ConnectionTrait>(conn: &C, source: Uuid, target: Uuid) -> Result<()> {
    let edges = Friendships::find()
        .filter(friendships::Column::UserId.eq(source))
        .all(conn)
        .await?;

    let moved: Vec<friendships::ActiveModel> = edges
        .into_iter()
        .filter(|edge| edge.friend_id != target)
        .flat_map(|edge| {
            [
                friendships::ActiveModel {
                    user_id: ActiveValue::Set(target),
                    friend_id: ActiveValue::Set(edge.friend_id),
                    status: ActiveValue::Set(edge.status.clone()),
                    initiator: ActiveValue::Set(edge.initiator),
                    created_at: ActiveValue::Set(edge.created_at),
                },
                friendships::ActiveModel {
                    user_id: ActiveValue::Set(edge.friend_id),
                    friend_id: ActiveValue::Set(target),
                    status: ActiveValue::Set(edge.status),
                    initiator: ActiveValue::Set(!edge.initiator),
                    created_at: ActiveValue::Set(edge.created_at),
                },
            ]
        })
        .collect();

    for chunk in moved.chunks(crate::BATCH_LIMIT) {
        Friendships::insert_many(chunk.to_vec())
            .on_conflict(
                OnConflict::columns([friendships::Column::UserId, friendships::Column::FriendId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }

    Friendships::delete_many()
        .filter(
            sea_orm::Condition::any()
                .add(friendships::Column::UserId.eq(source))
                .add(friendships::Column::FriendId.eq(source)),
        )
        .exec(conn)
        .await?;
    Ok(())
}

async fn merge_badges<C: ConnectionTrait>(conn: &C, source: Uuid, target: Uuid) -> Result<()> {
    let rows = UserBadges::find()
        .filter(user_badges::Column::UserId.eq(source))
        .all(conn)
        .await?;
    if !rows.is_empty() {
        let moved = rows.into_iter().map(|row| user_badges::ActiveModel {
            user_id: ActiveValue::Set(target),
            badge_id: ActiveValue::Set(row.badge_id),
            awarded_at: ActiveValue::Set(row.awarded_at),
        });
        UserBadges::insert_many(moved)
            .on_conflict(
                OnConflict::columns([user_badges::Column::UserId, user_badges::Column::BadgeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }
    UserBadges::delete_many()
        .filter(user_badges::Column::UserId.eq(source))
        .exec(conn)
        .await?;
    Ok(())
}
