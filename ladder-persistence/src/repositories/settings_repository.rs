use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};
use std::collections::BTreeMap;

use crate::entities::{announcements, prelude::*, settings};
use ladder_types::{Announcement, AnnouncementLevel};

const ANNOUNCEMENT_ROW: i32 = 1;

fn model_to_announcement(model: announcements::Model) -> Announcement {
    Announcement {
        text: model.text,
        level: AnnouncementLevel::parse(&model.level),
        is_active: model.is_active,
        updated_at: model.updated_at,
    }
}

/// Admin feature switches and the site banner. Missing keys read as off.
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, key: &str) -> Result<bool> {
        let model = Settings::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(model.map(|m| m.value).unwrap_or(false))
    }

    /// Flips a switch and returns its new value.
    pub async fn toggle(&self, key: &str) -> Result<bool> {
        let now = chrono::Utc::now();
        let value = match Settings::find_by_id(key.to_string()).one(&self.db).await? {
            Some(model) => {
                let value = !model.value;
                let mut active: settings::ActiveModel = model.into();
                active.value = ActiveValue::Set(value);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.db).await?;
                value
            }
            None => {
                let model = settings::ActiveModel {
                    key: ActiveValue::Set(key.to_string()),
                    value: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(now),
                };
                Settings::insert(model).exec_without_returning(&self.db).await?;
                true
            }
        };
        tracing::info!("Setting {} is now {}", key, value);
        Ok(value)
    }

    pub async fn all(&self) -> Result<BTreeMap<String, bool>> {
        let models = Settings::find()
            .order_by_asc(settings::Column::Key)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| (m.key, m.value)).collect())
    }

    pub async fn announcement(&self) -> Result<Option<Announcement>> {
        let model = Announcements::find_by_id(ANNOUNCEMENT_ROW).one(&self.db).await?;
        Ok(model.map(model_to_announcement))
    }

    /// Replaces the banner, creating it on first use.
    pub async fn set_announcement(
        &self,
        text: &str,
        level: AnnouncementLevel,
        is_active: bool,
    ) -> Result<Announcement> {
        let now = chrono::Utc::now();
        let model = match Announcements::find_by_id(ANNOUNCEMENT_ROW).one(&self.db).await? {
            Some(model) => {
                let mut active: announcements::ActiveModel = model.into();
                active.text = ActiveValue::Set(text.to_string());
                active.level = ActiveValue::Set(level.as_str().to_string());
                active.is_active = ActiveValue::Set(is_active);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.db).await?
            }
            None => {
                let model = announcements::ActiveModel {
                    id: ActiveValue::Set(ANNOUNCEMENT_ROW),
                    text: ActiveValue::Set(text.to_string()),
                    level: ActiveValue::Set(level.as_str().to_string()),
                    is_active: ActiveValue::Set(is_active),
                    updated_at: ActiveValue::Set(now),
                };
                model.insert(&self.db).await?
            }
        };
        tracing::info!("Announcement updated (active: {})", is_active);
        Ok(model_to_announcement(model))
    }
}
