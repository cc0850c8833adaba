use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{prelude::*, tournament_participants, tournaments};
use ladder_types::{
    CreateTournamentRequest, MatchType, Participant, ParticipantStatus, Tournament,
    TournamentStatus, UpdateTournamentRequest,
};

pub struct TournamentRepository {
    db: DatabaseConnection,
}

fn model_to_tournament(model: tournaments::Model) -> Tournament {
    Tournament {
        id: model.id,
        name: model.name,
        date: model.date,
        location: model.location,
        match_type: MatchType::parse(&model.match_type).unwrap_or(MatchType::Singles),
        status: TournamentStatus::parse(&model.status).unwrap_or(TournamentStatus::Active),
        organizer_id: model.organizer_id,
        created_at: model.created_at,
    }
}

fn model_to_participant(model: tournament_participants::Model) -> Participant {
    Participant {
        user_id: model.user_id,
        status: ParticipantStatus::parse(&model.status).unwrap_or(ParticipantStatus::Pending),
        team_name: model.team_name,
        email: model.email,
    }
}

fn participant(
    tournament_id: Uuid,
    user_id: Uuid,
    status: ParticipantStatus,
    email: Option<String>,
) -> tournament_participants::ActiveModel {
    tournament_participants::ActiveModel {
        tournament_id: ActiveValue::Set(tournament_id),
        user_id: ActiveValue::Set(user_id),
        status: ActiveValue::Set(status.as_str().to_string()),
        team_name: ActiveValue::Set(None),
        email: ActiveValue::Set(email),
        invited_at: ActiveValue::Set(chrono::Utc::now()),
    }
}

fn at_midnight(date: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl TournamentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tournament with the organizer as an accepted participant.
    pub async fn create(
        &self,
        organizer_id: Uuid,
        request: &CreateTournamentRequest,
    ) -> Result<Tournament> {
        let txn = self.db.begin().await?;
        let id = Uuid::new_v4();
        let model = tournaments::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(request.name.trim().to_string()),
            date: ActiveValue::Set(at_midnight(request.date)),
            location: ActiveValue::Set(request.location.clone()),
            match_type: ActiveValue::Set(request.match_type.as_str().to_string()),
            status: ActiveValue::Set(TournamentStatus::Active.as_str().to_string()),
            organizer_id: ActiveValue::Set(organizer_id),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };
        Tournaments::insert(model).exec(&txn).await?;
        TournamentParticipants::insert(participant(
            id,
            organizer_id,
            ParticipantStatus::Accepted,
            None,
        ))
        .exec_without_returning(&txn)
        .await?;

        let created = Tournaments::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created tournament"))?;
        txn.commit().await?;
        Ok(model_to_tournament(created))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tournament>> {
        let model = Tournaments::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_tournament))
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tournament>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Tournaments::find()
            .filter(tournaments::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_tournament).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateTournamentRequest,
    ) -> Result<Option<Tournament>> {
        let Some(model) = Tournaments::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: tournaments::ActiveModel = model.into();
        if let Some(name) = &request.name {
            active.name = ActiveValue::Set(name.trim().to_string());
        }
        if let Some(date) = request.date {
            active.date = ActiveValue::Set(at_midnight(date));
        }
        if let Some(location) = &request.location {
            active.location = ActiveValue::Set(Some(location.clone()));
        }
        if let Some(match_type) = request.match_type {
            active.match_type = ActiveValue::Set(match_type.as_str().to_string());
        }
        let updated = active.update(&self.db).await?;
        Ok(Some(model_to_tournament(updated)))
    }

    pub async fn set_status(&self, id: Uuid, status: TournamentStatus) -> Result<bool> {
        let result = Tournaments::update_many()
            .col_expr(tournaments::Column::Status, Expr::value(status.as_str()))
            .filter(tournaments::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Participants in invitation order.
    pub async fn participants(&self, tournament_id: Uuid) -> Result<Vec<Participant>> {
        let models = TournamentParticipants::find()
            .filter(tournament_participants::Column::TournamentId.eq(tournament_id))
            .order_by_asc(tournament_participants::Column::InvitedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_participant).collect())
    }

    pub async fn participant(
        &self,
        tournament_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Participant>> {
        let model = TournamentParticipants::find_by_id((tournament_id, user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_participant))
    }

    /// Adds a pending participant. Returns false when the user is already
    /// on the list.
    pub async fn invite(
        &self,
        tournament_id: Uuid,
        user_id: Uuid,
        email: Option<String>,
    ) -> Result<bool> {
        if self.participant(tournament_id, user_id).await?.is_some() {
            return Ok(false);
        }
        TournamentParticipants::insert(participant(
            tournament_id,
            user_id,
            ParticipantStatus::Pending,
            email,
        ))
        .exec_without_returning(&self.db)
        .await?;
        Ok(true)
    }

    /// Moves a pending participant to accepted.
    pub async fn accept(&self, tournament_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = TournamentParticipants::update_many()
            .col_expr(
                tournament_participants::Column::Status,
                Expr::value(ParticipantStatus::Accepted.as_str()),
            )
            .filter(tournament_participants::Column::TournamentId.eq(tournament_id))
            .filter(tournament_participants::Column::UserId.eq(user_id))
            .filter(tournament_participants::Column::Status.eq(ParticipantStatus::Pending.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Drops a pending invitation.
    pub async fn decline(&self, tournament_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = TournamentParticipants::delete_many()
            .filter(tournament_participants::Column::TournamentId.eq(tournament_id))
            .filter(tournament_participants::Column::UserId.eq(user_id))
            .filter(tournament_participants::Column::Status.eq(ParticipantStatus::Pending.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn set_team_name(
        &self,
        tournament_id: Uuid,
        user_id: Uuid,
        team_name: &str,
    ) -> Result<bool> {
        let Some(model) = TournamentParticipants::find_by_id((tournament_id, user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };
        let mut active: tournament_participants::ActiveModel = model.into();
        active.team_name = ActiveValue::Set(Some(team_name.trim().to_string()));
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Tournaments the user takes part in, with their participation status,
    /// soonest first.
    pub async fn for_user(&self, user_id: Uuid) -> Result<Vec<(Tournament, ParticipantStatus)>> {
        let rows = TournamentParticipants::find()
            .filter(tournament_participants::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.tournament_id).collect();
        let mut tournaments = self.find_by_ids(&ids).await?;
        tournaments.sort_by_key(|t| t.date);

        Ok(tournaments
            .into_iter()
            .filter_map(|t| {
                let row = rows.iter().find(|r| r.tournament_id == t.id)?;
                let status =
                    ParticipantStatus::parse(&row.status).unwrap_or(ParticipantStatus::Pending);
                Some((t, status))
            })
            .collect())
    }

    pub async fn owned_by(&self, organizer_id: Uuid) -> Result<Vec<Tournament>> {
        let models = Tournaments::find()
            .filter(tournaments::Column::OrganizerId.eq(organizer_id))
            .order_by_desc(tournaments::Column::Date)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_tournament).collect())
    }

    pub async fn count_not_completed(&self) -> Result<u64> {
        Ok(Tournaments::find()
            .filter(tournaments::Column::Status.ne(TournamentStatus::Completed.as_str()))
            .count(&self.db)
            .await?)
    }
}
