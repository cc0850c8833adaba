use anyhow::Result;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ActiveValue, ColumnTrait, Condition,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{friend_invites, friendships, prelude::*};
use crate::BATCH_LIMIT;
use ladder_types::{FriendStatus, Friendship, FriendshipState};

/// Friend edges are stored in both directions. The row owned by the user
/// who sent the request carries `initiator = true`.
pub struct FriendRepository {
    db: DatabaseConnection,
}

/// A stored referral link.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendInvite {
    pub token: String,
    pub inviter_id: Uuid,
    pub used: bool,
}

impl FriendRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_friendship(model: friendships::Model) -> Friendship {
        Friendship {
            user_id: model.user_id,
            friend_id: model.friend_id,
            status: FriendStatus::parse(&model.status).unwrap_or(FriendStatus::Pending),
            initiator: model.initiator,
            created_at: model.created_at,
        }
    }

    fn edge(user_id: Uuid, friend_id: Uuid, status: FriendStatus, initiator: bool) -> friendships::ActiveModel {
        friendships::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            friend_id: ActiveValue::Set(friend_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            initiator: ActiveValue::Set(initiator),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        }
    }

    pub async fn find_edge(&self, user_id: Uuid, friend_id: Uuid) -> Result<Option<Friendship>> {
        let model = Friendships::find_by_id((user_id, friend_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::model_to_friendship))
    }

    /// Relationship of `viewer` to `other`.
    pub async fn status_between(&self, viewer: Uuid, other: Uuid) -> Result<FriendshipState> {
        let state = match self.find_edge(viewer, other).await? {
            None => FriendshipState::None,
            Some(edge) if edge.status == FriendStatus::Accepted => FriendshipState::Friends,
            Some(edge) if edge.initiator => FriendshipState::RequestSent,
            Some(_) => FriendshipState::RequestReceived,
        };
        Ok(state)
    }

    /// Creates a pending pair of edges. Returns false when any edge already
    /// exists between the two users.
    pub async fn send_request(&self, from: Uuid, to: Uuid) -> Result<bool> {
        if self.find_edge(from, to).await?.is_some() || self.find_edge(to, from).await?.is_some() {
            return Ok(false);
        }
        Friendships::insert_many([
            Self::edge(from, to, FriendStatus::Pending, true),
            Self::edge(to, from, FriendStatus::Pending, false),
        ])
        .exec_without_returning(&self.db)
        .await?;
        Ok(true)
    }

    /// Accepts a request `user_id` received from `requester`.
    pub async fn accept(&self, user_id: Uuid, requester: Uuid) -> Result<bool> {
        let Some(edge) = self.find_edge(user_id, requester).await? else {
            return Ok(false);
        };
        if edge.status != FriendStatus::Pending || edge.initiator {
            return Ok(false);
        }
        Friendships::update_many()
            .col_expr(
                friendships::Column::Status,
                sea_orm::sea_query::Expr::value(FriendStatus::Accepted.as_str()),
            )
            .filter(Self::pair_condition(user_id, requester))
            .exec(&self.db)
            .await?;
        Ok(true)
    }

    /// Deletes both edges, whatever their status.
    pub async fn remove(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let result = Friendships::delete_many()
            .filter(Self::pair_condition(a, b))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    fn pair_condition(a: Uuid, b: Uuid) -> Condition {
        Condition::any()
            .add(
                Condition::all()
                    .add(friendships::Column::UserId.eq(a))
                    .add(friendships::Column::FriendId.eq(b)),
            )
            .add(
                Condition::all()
                    .add(friendships::Column::UserId.eq(b))
                    .add(friendships::Column::FriendId.eq(a)),
            )
    }

    /// Makes two users friends immediately, overwriting any pending edges.
    pub async fn befriend(&self, a: Uuid, b: Uuid) -> Result<()> {
        self.befriend_many(a, &[b]).await
    }

    /// Accepted edges between `user_id` and each of `others`, written in
    /// batches.
    pub async fn befriend_many(&self, user_id: Uuid, others: &[Uuid]) -> Result<()> {
        let others: Vec<Uuid> = others.iter().copied().filter(|id| *id != user_id).collect();
        for chunk in others.chunks(BATCH_LIMIT / 2) {
            let rows = chunk.iter().flat_map(|other| {
                [
                    Self::edge(user_id, *other, FriendStatus::Accepted, true),
                    Self::edge(*other, user_id, FriendStatus::Accepted, false),
                ]
            });
            Friendships::insert_many(rows)
                .on_conflict(
                    OnConflict::columns([friendships::Column::UserId, friendships::Column::FriendId])
                        .update_column(friendships::Column::Status)
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
        }
        tracing::debug!("Added {} friendships for {}", others.len(), user_id);
        Ok(())
    }

    pub async fn friends_of(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.edges_with(user_id, FriendStatus::Accepted, None).await
    }

    pub async fn incoming_requests(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.edges_with(user_id, FriendStatus::Pending, Some(false)).await
    }

    pub async fn outgoing_requests(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.edges_with(user_id, FriendStatus::Pending, Some(true)).await
    }

    async fn edges_with(
        &self,
        user_id: Uuid,
        status: FriendStatus,
        initiator: Option<bool>,
    ) -> Result<Vec<Uuid>> {
        let mut query = Friendships::find()
            .filter(friendships::Column::UserId.eq(user_id))
            .filter(friendships::Column::Status.eq(status.as_str()));
        if let Some(initiator) = initiator {
            query = query.filter(friendships::Column::Initiator.eq(initiator));
        }
        let models = query
            .order_by_desc(friendships::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.friend_id).collect())
    }

    /// Every accepted friendship, one entry per unordered pair.
    pub async fn accepted_edges(&self) -> Result<Vec<(Uuid, Uuid)>> {
        let models = Friendships::find()
            .filter(friendships::Column::Status.eq(FriendStatus::Accepted.as_str()))
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .filter(|m| m.user_id < m.friend_id)
            .map(|m| (m.user_id, m.friend_id))
            .collect())
    }

    pub async fn create_invite(&self, inviter_id: Uuid, token: &str) -> Result<()> {
        let model = friend_invites::ActiveModel {
            token: ActiveValue::Set(token.to_string()),
            inviter_id: ActiveValue::Set(inviter_id),
            used: ActiveValue::Set(false),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };
        FriendInvites::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn find_invite(&self, token: &str) -> Result<Option<FriendInvite>> {
        let model = FriendInvites::find_by_id(token.to_string()).one(&self.db).await?;
        Ok(model.map(|m| FriendInvite {
            token: m.token,
            inviter_id: m.inviter_id,
            used: m.used,
        }))
    }

    pub async fn mark_invite_used(&self, token: &str) -> Result<()> {
        if let Some(model) = FriendInvites::find_by_id(token.to_string()).one(&self.db).await? {
            let mut active: friend_invites::ActiveModel = model.into();
            active.used = ActiveValue::Set(true);
            active.update(&self.db).await?;
        }
        Ok(())
    }
}
