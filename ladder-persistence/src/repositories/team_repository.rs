use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::entities::{prelude::*, teams};
use ladder_types::{Team, DEFAULT_TEAM_ELO};

pub struct TeamRepository {
    db: DatabaseConnection,
}

/// Members in storage order.
pub(crate) fn sorted_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub(crate) fn model_to_team(model: teams::Model) -> Team {
    Team {
        id: model.id,
        player_a: model.player_a_id,
        player_b: model.player_b_id,
        name: model.name,
        wins: model.wins,
        losses: model.losses,
        elo: model.elo,
        created_at: model.created_at,
    }
}

pub(crate) async fn find_pair<C: ConnectionTrait>(
    conn: &C,
    a: Uuid,
    b: Uuid,
) -> Result<Option<teams::Model>> {
    let (first, second) = sorted_pair(a, b);
    Ok(Teams::find()
        .filter(teams::Column::PlayerAId.eq(first))
        .filter(teams::Column::PlayerBId.eq(second))
        .one(conn)
        .await?)
}

/// Returns the team for a pair of players, creating it with `name` on
/// first use.
pub(crate) async fn get_or_create_team<C: ConnectionTrait>(
    conn: &C,
    a: Uuid,
    b: Uuid,
    name: &str,
) -> Result<teams::Model> {
    if let Some(existing) = find_pair(conn, a, b).await? {
        return Ok(existing);
    }

    let (first, second) = sorted_pair(a, b);
    let id = Uuid::new_v4();
    let model = teams::ActiveModel {
        id: ActiveValue::Set(id),
        player_a_id: ActiveValue::Set(first),
        player_b_id: ActiveValue::Set(second),
        name: ActiveValue::Set(name.to_string()),
        wins: ActiveValue::Set(0),
        losses: ActiveValue::Set(0),
        elo: ActiveValue::Set(DEFAULT_TEAM_ELO),
        created_at: ActiveValue::Set(chrono::Utc::now()),
    };
    Teams::insert(model).exec(conn).await?;
    tracing::debug!("Created team {} for {} and {}", id, first, second);

    Teams::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created team"))
}

impl TeamRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_or_create(&self, a: Uuid, b: Uuid, name: &str) -> Result<Team> {
        Ok(model_to_team(get_or_create_team(&self.db, a, b, name).await?))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let model = Teams::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_team))
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Team>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Teams::find()
            .filter(teams::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_team).collect())
    }

    pub async fn find_by_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Team>> {
        Ok(find_pair(&self.db, a, b).await?.map(model_to_team))
    }

    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Team>> {
        let Some(model) = Teams::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: teams::ActiveModel = model.into();
        active.name = ActiveValue::Set(name.to_string());
        let updated = active.update(&self.db).await?;
        tracing::info!("Team {} renamed", id);
        Ok(Some(model_to_team(updated)))
    }
}
