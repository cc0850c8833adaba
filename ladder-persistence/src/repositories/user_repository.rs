use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use ladder_core::GHOST_PREFIX;
use ladder_types::{
    MatchType, PlayerRecord, StreakType, UpdateProfileRequest, User,
};

/// Fields supplied when a user row is created.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub auth_uid: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub dupr_rating: Option<f64>,
    pub is_ghost: bool,
    pub email_verified: bool,
}

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn model_to_user(model: users::Model) -> User {
        User {
            id: model.id,
            username: model.username,
            email: model.email,
            name: model.name,
            dupr_id: model.dupr_id,
            dupr_rating: model.dupr_rating,
            is_admin: model.is_admin,
            is_ghost: model.is_ghost,
            email_verified: model.email_verified,
            dark_mode: model.dark_mode,
            profile_picture_url: model.profile_picture_url,
            profile_picture_thumbnail_url: model.profile_picture_thumbnail_url,
            record: PlayerRecord {
                wins: model.wins,
                losses: model.losses,
                current_streak: model.current_streak,
                streak_type: model.streak_type.as_deref().and_then(StreakType::parse),
            },
            last_match_recorded_type: model
                .last_match_recorded_type
                .as_deref()
                .and_then(MatchType::parse),
            created_at: model.created_at,
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user_model = Users::find_by_id(id).one(&self.db).await?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Users::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_user).collect())
    }

    pub async fn find_by_auth_uid(&self, auth_uid: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::AuthUid.eq(auth_uid))
            .one(&self.db)
            .await?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(user_model.map(Self::model_to_user))
    }

    /// Emails are stored lower-cased.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .order_by_asc(users::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn find_ghost_by_email(&self, email: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .filter(users::Column::IsGhost.eq(true))
            .one(&self.db)
            .await?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        let user_model = users::ActiveModel {
            id: ActiveValue::Set(id),
            auth_uid: ActiveValue::Set(user.auth_uid),
            username: ActiveValue::Set(user.username),
            email: ActiveValue::Set(user.email.map(|e| e.to_lowercase())),
            name: ActiveValue::Set(user.name),
            dupr_id: ActiveValue::Set(None),
            dupr_rating: ActiveValue::Set(user.dupr_rating),
            is_admin: ActiveValue::Set(false),
            is_ghost: ActiveValue::Set(user.is_ghost),
            email_verified: ActiveValue::Set(user.email_verified),
            dark_mode: ActiveValue::Set(false),
            profile_picture_url: ActiveValue::Set(None),
            profile_picture_thumbnail_url: ActiveValue::Set(None),
            wins: ActiveValue::Set(0),
            losses: ActiveValue::Set(0),
            current_streak: ActiveValue::Set(0),
            streak_type: ActiveValue::Set(None),
            last_match_recorded_type: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        Users::insert(user_model).exec(&self.db).await?;

        let created_user = Users::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created user"))?;

        Ok(Self::model_to_user(created_user))
    }

    /// Placeholder account for someone invited by email before they sign up.
    pub async fn create_ghost(&self, email: &str, name: Option<String>) -> Result<User> {
        let suffix = Uuid::new_v4().simple().to_string();
        self.create_user(NewUser {
            username: format!("{GHOST_PREFIX}{}", &suffix[..8]),
            email: Some(email.to_lowercase()),
            name,
            is_ghost: true,
            ..Default::default()
        })
        .await
    }

    pub async fn update_profile(&self, user_id: Uuid, update: &UpdateProfileRequest) -> Result<User> {
        let model = Users::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found"))?;

        let mut active: users::ActiveModel = model.into();
        if let Some(name) = &update.name {
            active.name = ActiveValue::Set(Some(name.clone()));
        }
        if let Some(dupr_id) = &update.dupr_id {
            active.dupr_id = ActiveValue::Set(Some(dupr_id.clone()));
        }
        if let Some(rating) = update.dupr_rating {
            active.dupr_rating = ActiveValue::Set(Some(rating));
        }
        if let Some(dark_mode) = update.dark_mode {
            active.dark_mode = ActiveValue::Set(dark_mode);
        }
        if let Some(url) = &update.profile_picture_url {
            active.profile_picture_url = ActiveValue::Set(Some(url.clone()));
        }
        if let Some(url) = &update.profile_picture_thumbnail_url {
            active.profile_picture_thumbnail_url = ActiveValue::Set(Some(url.clone()));
        }
        active.updated_at = ActiveValue::Set(chrono::Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Self::model_to_user(updated))
    }

    pub async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> Result<bool> {
        let Some(model) = Users::find_by_id(user_id).one(&self.db).await? else {
            return Ok(false);
        };
        let mut active: users::ActiveModel = model.into();
        active.is_admin = ActiveValue::Set(is_admin);
        active.updated_at = ActiveValue::Set(chrono::Utc::now());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn set_email_verified(&self, user_id: Uuid, verified: bool) -> Result<bool> {
        let Some(model) = Users::find_by_id(user_id).one(&self.db).await? else {
            return Ok(false);
        };
        let mut active: users::ActiveModel = model.into();
        active.email_verified = ActiveValue::Set(verified);
        active.updated_at = ActiveValue::Set(chrono::Utc::now());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        let result = Users::delete_by_id(user_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Users other than `exclude`, newest accounts first.
    pub async fn list_users(&self, exclude: &[Uuid], limit: u64) -> Result<Vec<User>> {
        let mut query = Users::find();
        if !exclude.is_empty() {
            query = query.filter(users::Column::Id.is_not_in(exclude.to_vec()));
        }
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_user).collect())
    }

    /// Substring match on username, name or email.
    pub async fn search(&self, term: &str, exclude: &[Uuid], limit: u64) -> Result<Vec<User>> {
        let mut query = Users::find().filter(
            Condition::any()
                .add(users::Column::Username.contains(term))
                .add(users::Column::Name.contains(term))
                .add(users::Column::Email.contains(term)),
        );
        if !exclude.is_empty() {
            query = query.filter(users::Column::Id.is_not_in(exclude.to_vec()));
        }
        let models = query
            .order_by_asc(users::Column::Username)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_user).collect())
    }

    pub async fn all_users(&self) -> Result<Vec<User>> {
        let models = Users::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_user).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Users::find().count(&self.db).await?)
    }
}
