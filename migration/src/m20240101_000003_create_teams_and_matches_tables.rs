use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::PlayerAId).uuid().not_null())
                    .col(ColumnDef::new(Teams::PlayerBId).uuid().not_null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::Wins).integer().not_null().default(0))
                    .col(ColumnDef::new(Teams::Losses).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Teams::Elo)
                            .double()
                            .not_null()
                            .default(1200.0),
                    )
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_player_a_id")
                            .from(Teams::Table, Teams::PlayerAId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_player_b_id")
                            .from(Teams::Table, Teams::PlayerBId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A pair of players maps to exactly one team
        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx_teams_pair")
                    .table(Teams::Table)
                    .col(Teams::PlayerAId)
                    .col(Teams::PlayerBId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Matches::MatchType).string().not_null())
                    .col(ColumnDef::new(Matches::Team1Player1Id).uuid().not_null())
                    .col(ColumnDef::new(Matches::Team1Player2Id).uuid().null())
                    .col(ColumnDef::new(Matches::Team2Player1Id).uuid().not_null())
                    .col(ColumnDef::new(Matches::Team2Player2Id).uuid().null())
                    .col(ColumnDef::new(Matches::Team1Id).uuid().null())
                    .col(ColumnDef::new(Matches::Team2Id).uuid().null())
                    .col(ColumnDef::new(Matches::Team1Score).integer().not_null())
                    .col(ColumnDef::new(Matches::Team2Score).integer().not_null())
                    .col(ColumnDef::new(Matches::Winner).string().not_null())
                    .col(
                        ColumnDef::new(Matches::IsUpset)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Matches::MatchDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Matches::GroupId).uuid().null())
                    .col(ColumnDef::new(Matches::TournamentId).uuid().null())
                    .col(
                        ColumnDef::new(Matches::Status)
                            .string()
                            .not_null()
                            .default("completed"),
                    )
                    .col(ColumnDef::new(Matches::RecordedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let indexes = [
            ("idx_matches_match_date", Matches::MatchDate),
            ("idx_matches_group_id", Matches::GroupId),
            ("idx_matches_tournament_id", Matches::TournamentId),
            ("idx_matches_team1_player1_id", Matches::Team1Player1Id),
            ("idx_matches_team1_player2_id", Matches::Team1Player2Id),
            ("idx_matches_team2_player1_id", Matches::Team2Player1Id),
            ("idx_matches_team2_player2_id", Matches::Team2Player2Id),
        ];
        for (name, column) in indexes {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Matches::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Teams {
    Table,
    Id,
    PlayerAId,
    PlayerBId,
    Name,
    Wins,
    Losses,
    Elo,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Matches {
    Table,
    Id,
    MatchType,
    #[sea_orm(iden = "team1_player1_id")]
    Team1Player1Id,
    #[sea_orm(iden = "team1_player2_id")]
    Team1Player2Id,
    #[sea_orm(iden = "team2_player1_id")]
    Team2Player1Id,
    #[sea_orm(iden = "team2_player2_id")]
    Team2Player2Id,
    #[sea_orm(iden = "team1_id")]
    Team1Id,
    #[sea_orm(iden = "team2_id")]
    Team2Id,
    #[sea_orm(iden = "team1_score")]
    Team1Score,
    #[sea_orm(iden = "team2_score")]
    Team2Score,
    Winner,
    IsUpset,
    MatchDate,
    GroupId,
    TournamentId,
    Status,
    RecordedBy,
    CreatedAt,
}
