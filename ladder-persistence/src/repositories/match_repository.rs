use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{matches, prelude::*, teams, users};
use crate::repositories::team_repository::get_or_create_team;
use crate::repositories::user_repository::UserRepository;
use ladder_core::{team_name, winner_of, MatchLineup, RunningStats};
use ladder_types::{Match, MatchCursor, MatchType, Side};

const COMPLETED: &str = "completed";

/// Context stored alongside a validated lineup.
#[derive(Debug, Clone)]
pub struct MatchMeta {
    pub match_date: DateTime<Utc>,
    pub group_id: Option<Uuid>,
    pub tournament_id: Option<Uuid>,
    pub recorded_by: Uuid,
    pub is_upset: bool,
}

pub struct MatchRepository {
    db: DatabaseConnection,
}

pub(crate) fn model_to_match(model: matches::Model) -> Match {
    let team1: Vec<Uuid> = std::iter::once(model.team1_player1_id)
        .chain(model.team1_player2_id)
        .collect();
    let team2: Vec<Uuid> = std::iter::once(model.team2_player1_id)
        .chain(model.team2_player2_id)
        .collect();
    let match_type = MatchType::parse(&model.match_type).unwrap_or(if team1.len() > 1 {
        MatchType::Doubles
    } else {
        MatchType::Singles
    });
    let winner = Side::parse(&model.winner)
        .unwrap_or_else(|| winner_of(model.team1_score, model.team2_score));

    Match {
        id: model.id,
        match_type,
        team1,
        team2,
        team1_id: model.team1_id,
        team2_id: model.team2_id,
        team1_score: model.team1_score,
        team2_score: model.team2_score,
        winner,
        is_upset: model.is_upset,
        match_date: model.match_date,
        group_id: model.group_id,
        tournament_id: model.tournament_id,
        recorded_by: model.recorded_by,
        created_at: model.created_at,
    }
}

fn involving(user_id: Uuid) -> Condition {
    Condition::any()
        .add(matches::Column::Team1Player1Id.eq(user_id))
        .add(matches::Column::Team1Player2Id.eq(user_id))
        .add(matches::Column::Team2Player1Id.eq(user_id))
        .add(matches::Column::Team2Player2Id.eq(user_id))
}

fn involving_any(user_ids: &[Uuid]) -> Condition {
    Condition::any()
        .add(matches::Column::Team1Player1Id.is_in(user_ids.to_vec()))
        .add(matches::Column::Team1Player2Id.is_in(user_ids.to_vec()))
        .add(matches::Column::Team2Player1Id.is_in(user_ids.to_vec()))
        .add(matches::Column::Team2Player2Id.is_in(user_ids.to_vec()))
}

async fn bump_team<C: ConnectionTrait>(conn: &C, team: teams::Model, won: bool) -> Result<()> {
    let (wins, losses) = (team.wins, team.losses);
    let mut active: teams::ActiveModel = team.into();
    if won {
        active.wins = ActiveValue::Set(wins + 1);
    } else {
        active.losses = ActiveValue::Set(losses + 1);
    }
    active.update(conn).await?;
    Ok(())
}

async fn resolve_team<C: ConnectionTrait>(
    conn: &C,
    side: &[Uuid],
    players: &HashMap<Uuid, users::Model>,
) -> Result<Option<teams::Model>> {
    let [a, b] = side else {
        return Ok(None);
    };
    let user = |id: &Uuid| {
        players
            .get(id)
            .cloned()
            .map(UserRepository::model_to_user)
            .ok_or_else(|| anyhow::anyhow!("Player {} not found", id))
    };
    let name = team_name(&user(a)?, &user(b)?);
    Ok(Some(get_or_create_team(conn, *a, *b, &name).await?))
}

impl MatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a match and updates every derived counter in one transaction:
    /// team records for doubles pairs and each player's running record.
    pub async fn record(&self, lineup: &MatchLineup, meta: MatchMeta) -> Result<Match> {
        let txn = self.db.begin().await?;

        let player_ids: Vec<Uuid> = lineup.players().collect();
        let players: HashMap<Uuid, users::Model> = Users::find()
            .filter(users::Column::Id.is_in(player_ids.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        if players.len() != player_ids.len() {
            return Err(anyhow::anyhow!("Match references an unknown player"));
        }

        let winner = lineup.winner();
        let team1 = resolve_team(&txn, &lineup.team1, &players).await?;
        let team2 = resolve_team(&txn, &lineup.team2, &players).await?;
        let team1_id = team1.as_ref().map(|t| t.id);
        let team2_id = team2.as_ref().map(|t| t.id);
        if let Some(team) = team1 {
            bump_team(&txn, team, winner == Side::Team1).await?;
        }
        if let Some(team) = team2 {
            bump_team(&txn, team, winner == Side::Team2).await?;
        }

        let id = Uuid::new_v4();
        let model = matches::ActiveModel {
            id: ActiveValue::Set(id),
            match_type: ActiveValue::Set(lineup.match_type.as_str().to_string()),
            team1_player1_id: ActiveValue::Set(lineup.team1[0]),
            team1_player2_id: ActiveValue::Set(lineup.team1.get(1).copied()),
            team2_player1_id: ActiveValue::Set(lineup.team2[0]),
            team2_player2_id: ActiveValue::Set(lineup.team2.get(1).copied()),
            team1_id: ActiveValue::Set(team1_id),
            team2_id: ActiveValue::Set(team2_id),
            team1_score: ActiveValue::Set(lineup.team1_score),
            team2_score: ActiveValue::Set(lineup.team2_score),
            winner: ActiveValue::Set(winner.as_str().to_string()),
            is_upset: ActiveValue::Set(meta.is_upset),
            match_date: ActiveValue::Set(meta.match_date),
            group_id: ActiveValue::Set(meta.group_id),
            tournament_id: ActiveValue::Set(meta.tournament_id),
            status: ActiveValue::Set(COMPLETED.to_string()),
            recorded_by: ActiveValue::Set(meta.recorded_by),
            created_at: ActiveValue::Set(Utc::now()),
        };
        Matches::insert(model).exec(&txn).await?;

        let winners = match winner {
            Side::Team1 => &lineup.team1,
            Side::Team2 => &lineup.team2,
        };
        for (player_id, model) in players {
            let won = winners.contains(&player_id);
            let mut record = UserRepository::model_to_user(model.clone()).record;
            record.apply(won);

            let mut active: users::ActiveModel = model.into();
            active.wins = ActiveValue::Set(record.wins);
            active.losses = ActiveValue::Set(record.losses);
            active.current_streak = ActiveValue::Set(record.current_streak);
            active.streak_type =
                ActiveValue::Set(record.streak_type.map(|s| s.as_str().to_string()));
            active.last_match_recorded_type =
                ActiveValue::Set(Some(lineup.match_type.as_str().to_string()));
            active.update(&txn).await?;
        }

        let stored = Matches::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve recorded match"))?;
        txn.commit().await?;

        tracing::info!(
            "Recorded {} match {} ({}-{})",
            lineup.match_type.as_str(),
            id,
            lineup.team1_score,
            lineup.team2_score
        );
        Ok(model_to_match(stored))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Match>> {
        let model = Matches::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_match))
    }

    /// A page of a user's matches, newest first. `before` continues from
    /// the last match of the previous page.
    pub async fn for_user(
        &self,
        user_id: Uuid,
        limit: u64,
        before: Option<&MatchCursor>,
    ) -> Result<Vec<Match>> {
        let mut query = Matches::find().filter(involving(user_id));
        if let Some(cursor) = before {
            query = query.filter(
                Condition::any()
                    .add(matches::Column::MatchDate.lt(cursor.match_date))
                    .add(
                        Condition::all()
                            .add(matches::Column::MatchDate.eq(cursor.match_date))
                            .add(matches::Column::Id.lt(cursor.id)),
                    ),
            );
        }
        let models = query
            .order_by_desc(matches::Column::MatchDate)
            .order_by_desc(matches::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    /// Full history of a user, newest first.
    pub async fn all_for_user(&self, user_id: Uuid) -> Result<Vec<Match>> {
        let models = Matches::find()
            .filter(involving(user_id))
            .order_by_desc(matches::Column::MatchDate)
            .order_by_desc(matches::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    /// Matches involving at least one of `user_ids`, newest first.
    pub async fn for_users(&self, user_ids: &[Uuid]) -> Result<Vec<Match>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Matches::find()
            .filter(involving_any(user_ids))
            .order_by_desc(matches::Column::MatchDate)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    pub async fn for_group(&self, group_id: Uuid) -> Result<Vec<Match>> {
        let models = Matches::find()
            .filter(matches::Column::GroupId.eq(group_id))
            .order_by_desc(matches::Column::MatchDate)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    /// Matches of one doubles team, newest first.
    pub async fn for_team(&self, team_id: Uuid, limit: u64) -> Result<Vec<Match>> {
        let models = Matches::find()
            .filter(
                Condition::any()
                    .add(matches::Column::Team1Id.eq(team_id))
                    .add(matches::Column::Team2Id.eq(team_id)),
            )
            .order_by_desc(matches::Column::MatchDate)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    pub async fn for_tournament(&self, tournament_id: Uuid) -> Result<Vec<Match>> {
        let models = Matches::find()
            .filter(matches::Column::TournamentId.eq(tournament_id))
            .order_by_asc(matches::Column::MatchDate)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }

    pub async fn count_for_tournament(&self, tournament_id: Uuid) -> Result<u64> {
        Ok(Matches::find()
            .filter(matches::Column::TournamentId.eq(tournament_id))
            .count(&self.db)
            .await?)
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<u64> {
        Ok(Matches::find()
            .filter(matches::Column::MatchDate.gte(since))
            .count(&self.db)
            .await?)
    }

    pub async fn latest(&self, limit: u64) -> Result<Vec<Match>> {
        let models = Matches::find()
            .order_by_desc(matches::Column::MatchDate)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_match).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{create_test_user, setup_test_db};
    use crate::repositories::TeamRepository;
    use chrono::Duration;
    use ladder_types::StreakType;

    fn meta(recorded_by: Uuid, days_ago: i64) -> MatchMeta {
        MatchMeta {
            match_date: Utc::now() - Duration::days(days_ago),
            group_id: None,
            tournament_id: None,
            recorded_by,
            is_upset: false,
        }
    }

    fn singles(a: Uuid, b: Uuid, s1: i32, s2: i32) -> MatchLineup {
        MatchLineup {
            match_type: MatchType::Singles,
            team1: vec![a],
            team2: vec![b],
            team1_score: s1,
            team2_score: s2,
        }
    }

    #[tokio::test]
    async fn test_record_singles_updates_running_records() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let repo = MatchRepository::new(db.clone());
        let users = UserRepository::new(db);

        repo.record(&singles(alice.id, bob.id, 11, 7), meta(alice.id, 2))
            .await
            .unwrap();
        let stored = repo
            .record(&singles(alice.id, bob.id, 11, 9), meta(alice.id, 1))
            .await
            .unwrap();
        assert_eq!(stored.winner, Side::Team1);
        assert!(stored.team1_id.is_none());

        let alice = users.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(alice.record.wins, 2);
        assert_eq!(alice.record.current_streak, 2);
        assert_eq!(alice.record.streak_type, Some(StreakType::W));
        assert_eq!(alice.last_match_recorded_type, Some(MatchType::Singles));

        let bob = users.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(bob.record.losses, 2);
        assert_eq!(bob.record.streak_type, Some(StreakType::L));
    }

    #[tokio::test]
    async fn test_record_doubles_creates_and_reuses_teams() {
        let db = setup_test_db().await;
        let a = create_test_user(&db, "a").await;
        let b = create_test_user(&db, "b").await;
        let c = create_test_user(&db, "c").await;
        let d = create_test_user(&db, "d").await;
        let repo = MatchRepository::new(db.clone());

        let lineup = MatchLineup {
            match_type: MatchType::Doubles,
            team1: vec![a.id, b.id],
            team2: vec![c.id, d.id],
            team1_score: 8,
            team2_score: 11,
        };
        let first = repo.record(&lineup, meta(a.id, 1)).await.unwrap();
        let second = repo.record(&lineup, meta(a.id, 0)).await.unwrap();
        assert_eq!(first.team1_id, second.team1_id);
        assert_eq!(first.winner, Side::Team2);

        let teams = TeamRepository::new(db);
        let winners = teams
            .find_by_id(first.team2_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(winners.wins, 2);
        assert_eq!(winners.losses, 0);
        assert_eq!(winners.name, "c & d");

        let team_matches = repo.for_team(winners.id, 10).await.unwrap();
        assert_eq!(team_matches.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_player_rolls_back() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let repo = MatchRepository::new(db.clone());

        let result = repo
            .record(&singles(alice.id, Uuid::new_v4(), 11, 3), meta(alice.id, 0))
            .await;
        assert!(result.is_err());
        assert!(repo.latest(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_for_user_pages_newest_first() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let repo = MatchRepository::new(db);

        for days_ago in 0..5 {
            repo.record(&singles(alice.id, bob.id, 11, 5), meta(alice.id, days_ago))
                .await
                .unwrap();
        }

        let first_page = repo.for_user(bob.id, 3, None).await.unwrap();
        assert_eq!(first_page.len(), 3);
        assert!(first_page[0].match_date > first_page[1].match_date);

        let last = first_page.last().unwrap();
        let cursor = MatchCursor {
            match_date: last.match_date,
            id: last.id,
        };
        let second_page = repo.for_user(bob.id, 3, Some(&cursor)).await.unwrap();
        assert_eq!(second_page.len(), 2);
        assert!(second_page[0].match_date < last.match_date);

        assert_eq!(repo.all_for_user(alice.id).await.unwrap().len(), 5);
        assert_eq!(
            repo.count_since(Utc::now() - Duration::hours(36)).await.unwrap(),
            2
        );
    }
}
