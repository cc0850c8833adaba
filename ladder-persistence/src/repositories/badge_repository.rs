use anyhow::Result;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{prelude::*, user_badges};
use ladder_core::badge;
use ladder_types::{Badge, BadgeId};

pub struct BadgeRepository {
    db: DatabaseConnection,
}

impl BadgeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true when the badge was newly awarded.
    pub async fn award(&self, user_id: Uuid, badge_id: BadgeId) -> Result<bool> {
        let existing = UserBadges::find_by_id((user_id, badge_id.as_str().to_string()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }
        let model = user_badges::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            badge_id: ActiveValue::Set(badge_id.as_str().to_string()),
            awarded_at: ActiveValue::Set(chrono::Utc::now()),
        };
        UserBadges::insert(model).exec_without_returning(&self.db).await?;
        tracing::info!("Awarded badge {} to {}", badge_id.as_str(), user_id);
        Ok(true)
    }

    /// Earned badges, oldest award first. Unknown ids are skipped.
    pub async fn badges_for(&self, user_id: Uuid) -> Result<Vec<Badge>> {
        let models = UserBadges::find()
            .filter(user_badges::Column::UserId.eq(user_id))
            .order_by_asc(user_badges::Column::AwardedAt)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .filter_map(|m| BadgeId::parse(&m.badge_id).map(|id| badge(id, Some(m.awarded_at))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_award_is_idempotent() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "winner").await;
        let repo = BadgeRepository::new(db);

        assert!(repo.award(user.id, BadgeId::Rookie).await.unwrap());
        assert!(!repo.award(user.id, BadgeId::Rookie).await.unwrap());
        assert!(repo.award(user.id, BadgeId::HotStreak).await.unwrap());

        let badges = repo.badges_for(user.id).await.unwrap();
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].id, BadgeId::Rookie);
        assert!(badges.iter().all(|b| b.awarded_at.is_some()));
    }
}
