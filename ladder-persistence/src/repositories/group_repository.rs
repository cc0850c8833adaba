use anyhow::Result;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{group_invites, group_members, groups, matches, prelude::*};
use ladder_types::{
    CreateGroupRequest, Group, GroupInvite, InviteStatus, UpdateGroupRequest,
};

pub struct GroupRepository {
    db: DatabaseConnection,
}

fn model_to_group(model: groups::Model) -> Group {
    Group {
        id: model.id,
        name: model.name,
        description: model.description,
        is_public: model.is_public,
        owner_id: model.owner_id,
        profile_picture_url: model.profile_picture_url,
        created_at: model.created_at,
    }
}

fn model_to_invite(model: group_invites::Model) -> GroupInvite {
    GroupInvite {
        id: model.token_hash,
        group_id: model.group_id,
        email: model.email,
        name: model.name,
        inviter_id: model.inviter_id,
        used: model.used,
        status: InviteStatus::parse(&model.status).unwrap_or(InviteStatus::Sending),
        last_error: model.last_error,
        created_at: model.created_at,
    }
}

fn membership(group_id: Uuid, user_id: Uuid) -> group_members::ActiveModel {
    group_members::ActiveModel {
        group_id: ActiveValue::Set(group_id),
        user_id: ActiveValue::Set(user_id),
        joined_at: ActiveValue::Set(chrono::Utc::now()),
    }
}

impl GroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a group with its owner as the first member.
    pub async fn create(&self, owner_id: Uuid, request: &CreateGroupRequest) -> Result<Group> {
        let txn = self.db.begin().await?;
        let id = Uuid::new_v4();
        let model = groups::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(request.name.trim().to_string()),
            description: ActiveValue::Set(request.description.clone()),
            is_public: ActiveValue::Set(request.is_public),
            owner_id: ActiveValue::Set(owner_id),
            profile_picture_url: ActiveValue::Set(request.profile_picture_url.clone()),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };
        Groups::insert(model).exec(&txn).await?;
        GroupMembers::insert(membership(id, owner_id))
            .exec_without_returning(&txn)
            .await?;

        let created = Groups::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created group"))?;
        txn.commit().await?;

        Ok(model_to_group(created))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let model = Groups::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_group))
    }

    pub async fn update(&self, id: Uuid, request: &UpdateGroupRequest) -> Result<Option<Group>> {
        let Some(model) = Groups::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: groups::ActiveModel = model.into();
        if let Some(name) = &request.name {
            active.name = ActiveValue::Set(name.trim().to_string());
        }
        if let Some(description) = &request.description {
            active.description = ActiveValue::Set(Some(description.clone()));
        }
        if let Some(is_public) = request.is_public {
            active.is_public = ActiveValue::Set(is_public);
        }
        if let Some(url) = &request.profile_picture_url {
            active.profile_picture_url = ActiveValue::Set(Some(url.clone()));
        }
        let updated = active.update(&self.db).await?;
        Ok(Some(model_to_group(updated)))
    }

    /// Removes the group with its memberships and invites. Matches played
    /// in the group are kept and detached.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let txn = self.db.begin().await?;
        Matches::update_many()
            .col_expr(matches::Column::GroupId, Expr::value(Option::<Uuid>::None))
            .filter(matches::Column::GroupId.eq(id))
            .exec(&txn)
            .await?;
        GroupInvites::delete_many()
            .filter(group_invites::Column::GroupId.eq(id))
            .exec(&txn)
            .await?;
        GroupMembers::delete_many()
            .filter(group_members::Column::GroupId.eq(id))
            .exec(&txn)
            .await?;
        let result = Groups::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Member ids in join order.
    pub async fn member_ids(&self, group_id: Uuid) -> Result<Vec<Uuid>> {
        let models = GroupMembers::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .order_by_asc(group_members::Column::JoinedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.user_id).collect())
    }

    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let model = GroupMembers::find_by_id((group_id, user_id))
            .one(&self.db)
            .await?;
        Ok(model.is_some())
    }

    /// Returns false when the user was already a member.
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.add_members(group_id, &[user_id]).await? > 0)
    }

    pub async fn add_members(&self, group_id: Uuid, user_ids: &[Uuid]) -> Result<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let inserted = GroupMembers::insert_many(user_ids.iter().map(|id| membership(group_id, *id)))
            .on_conflict(
                OnConflict::columns([group_members::Column::GroupId, group_members::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted)
    }

    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = GroupMembers::delete_by_id((group_id, user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn groups_for_user(&self, user_id: Uuid) -> Result<Vec<Group>> {
        let group_ids: Vec<Uuid> = GroupMembers::find()
            .filter(group_members::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Groups::find()
            .filter(groups::Column::Id.is_in(group_ids))
            .order_by_asc(groups::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_group).collect())
    }

    pub async fn public_groups(&self, limit: u64) -> Result<Vec<Group>> {
        let models = Groups::find()
            .filter(groups::Column::IsPublic.eq(true))
            .order_by_desc(groups::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_group).collect())
    }

    /// Case-insensitive name search over public groups.
    pub async fn search_public(&self, term: &str, limit: u64) -> Result<Vec<Group>> {
        let models = Groups::find()
            .filter(groups::Column::IsPublic.eq(true))
            .filter(groups::Column::Name.contains(term))
            .order_by_asc(groups::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_group).collect())
    }

    pub async fn member_count(&self, group_id: Uuid) -> Result<u64> {
        Ok(GroupMembers::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .count(&self.db)
            .await?)
    }

    pub async fn create_invite(
        &self,
        token_hash: &str,
        group_id: Uuid,
        email: &str,
        name: Option<String>,
        inviter_id: Uuid,
    ) -> Result<GroupInvite> {
        let model = group_invites::ActiveModel {
            token_hash: ActiveValue::Set(token_hash.to_string()),
            group_id: ActiveValue::Set(group_id),
            email: ActiveValue::Set(email.to_lowercase()),
            name: ActiveValue::Set(name),
            inviter_id: ActiveValue::Set(inviter_id),
            used: ActiveValue::Set(false),
            status: ActiveValue::Set(InviteStatus::Sending.as_str().to_string()),
            last_error: ActiveValue::Set(None),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };
        let inserted = model.insert(&self.db).await?;
        Ok(model_to_invite(inserted))
    }

    pub async fn find_invite(&self, token_hash: &str) -> Result<Option<GroupInvite>> {
        let model = GroupInvites::find_by_id(token_hash.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_invite))
    }

    pub async fn set_invite_status(
        &self,
        token_hash: &str,
        status: InviteStatus,
        last_error: Option<String>,
    ) -> Result<()> {
        GroupInvites::update_many()
            .col_expr(group_invites::Column::Status, Expr::value(status.as_str()))
            .col_expr(group_invites::Column::LastError, Expr::value(last_error))
            .filter(group_invites::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn mark_invite_used(&self, token_hash: &str) -> Result<()> {
        GroupInvites::update_many()
            .col_expr(group_invites::Column::Used, Expr::value(true))
            .filter(group_invites::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Unused invites, newest first.
    pub async fn pending_invites(&self, group_id: Uuid) -> Result<Vec<GroupInvite>> {
        let models = GroupInvites::find()
            .filter(group_invites::Column::GroupId.eq(group_id))
            .filter(group_invites::Column::Used.eq(false))
            .order_by_desc(group_invites::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_invite).collect())
    }

    pub async fn delete_invite(&self, token_hash: &str) -> Result<bool> {
        let result = GroupInvites::delete_by_id(token_hash.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::match_repository::{MatchMeta, MatchRepository};
    use crate::repositories::test_support::{create_test_user, setup_test_db};
    use ladder_core::MatchLineup;
    use ladder_types::MatchType;

    fn request(name: &str, is_public: bool) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            description: Some("Tuesday night".to_string()),
            is_public,
            profile_picture_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_group_adds_owner() {
        let db = setup_test_db().await;
        let owner = create_test_user(&db, "owner").await;
        let other = create_test_user(&db, "other").await;
        let repo = GroupRepository::new(db);

        let group = repo.create(owner.id, &request("  Dinkers ", true)).await.unwrap();
        assert_eq!(group.name, "Dinkers");
        assert!(repo.is_member(group.id, owner.id).await.unwrap());
        assert_eq!(repo.member_count(group.id).await.unwrap(), 1);

        assert!(repo.add_member(group.id, other.id).await.unwrap());
        assert!(!repo.add_member(group.id, other.id).await.unwrap());
        assert_eq!(repo.member_ids(group.id).await.unwrap(), vec![owner.id, other.id]);
        assert_eq!(repo.groups_for_user(other.id).await.unwrap().len(), 1);

        assert!(repo.remove_member(group.id, other.id).await.unwrap());
        assert!(repo.groups_for_user(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_public_listing_and_update() {
        let db = setup_test_db().await;
        let owner = create_test_user(&db, "owner").await;
        let repo = GroupRepository::new(db);

        let open = repo.create(owner.id, &request("Open Play", true)).await.unwrap();
        let private = repo.create(owner.id, &request("Closed", false)).await.unwrap();

        let public = repo.public_groups(10).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, open.id);
        assert_eq!(repo.search_public("Open", 10).await.unwrap().len(), 1);

        let updated = repo
            .update(
                private.id,
                &UpdateGroupRequest {
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_public);
        assert_eq!(repo.public_groups(10).await.unwrap().len(), 2);
        assert!(repo
            .update(Uuid::new_v4(), &UpdateGroupRequest::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_detaches_matches() {
        let db = setup_test_db().await;
        let owner = create_test_user(&db, "owner").await;
        let rival = create_test_user(&db, "rival").await;
        let repo = GroupRepository::new(db.clone());
        let matches = MatchRepository::new(db);

        let group = repo.create(owner.id, &request("Ladder", false)).await.unwrap();
        let lineup = MatchLineup {
            match_type: MatchType::Singles,
            team1: vec![owner.id],
            team2: vec![rival.id],
            team1_score: 11,
            team2_score: 4,
        };
        let recorded = matches
            .record(
                &lineup,
                MatchMeta {
                    match_date: chrono::Utc::now(),
                    group_id: Some(group.id),
                    tournament_id: None,
                    recorded_by: owner.id,
                    is_upset: false,
                },
            )
            .await
            .unwrap();
        repo.create_invite("hash", group.id, "x@y.z", None, owner.id)
            .await
            .unwrap();

        assert!(repo.delete(group.id).await.unwrap());
        assert!(repo.find_by_id(group.id).await.unwrap().is_none());
        assert!(repo.find_invite("hash").await.unwrap().is_none());

        let kept = matches.find_by_id(recorded.id).await.unwrap().unwrap();
        assert!(kept.group_id.is_none());
    }

    #[tokio::test]
    async fn test_invite_lifecycle() {
        let db = setup_test_db().await;
        let owner = create_test_user(&db, "owner").await;
        let repo = GroupRepository::new(db);
        let group = repo.create(owner.id, &request("Club", false)).await.unwrap();

        let invite = repo
            .create_invite("abc", group.id, "Guest@Mail.com", Some("Gus".into()), owner.id)
            .await
            .unwrap();
        assert_eq!(invite.status, InviteStatus::Sending);
        assert_eq!(invite.email, "guest@mail.com");

        repo.set_invite_status("abc", InviteStatus::Failed, Some("smtp down".into()))
            .await
            .unwrap();
        let failed = repo.find_invite("abc").await.unwrap().unwrap();
        assert_eq!(failed.status, InviteStatus::Failed);
        assert_eq!(failed.last_error.as_deref(), Some("smtp down"));

        assert_eq!(repo.pending_invites(group.id).await.unwrap().len(), 1);
        repo.mark_invite_used("abc").await.unwrap();
        assert!(repo.pending_invites(group.id).await.unwrap().is_empty());

        assert!(repo.delete_invite("abc").await.unwrap());
        assert!(!repo.delete_invite("abc").await.unwrap());
    }
}
