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
                    .table(Tournaments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournaments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournaments::Name).string().not_null())
                    .col(
                        ColumnDef::new(Tournaments::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournaments::Location).string().null())
                    .col(ColumnDef::new(Tournaments::MatchType).string().not_null())
                    .col(
                        ColumnDef::new(Tournaments::Status)
                            .string()
                            .not_null()
                            .default("Active"),
                    )
                    .col(ColumnDef::new(Tournaments::OrganizerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Tournaments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TournamentParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TournamentParticipants::TournamentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentParticipants::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentParticipants::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TournamentParticipants::TeamName).string().null())
                    .col(ColumnDef::new(TournamentParticipants::Email).string().null())
                    .col(
                        ColumnDef::new(TournamentParticipants::InvitedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TournamentParticipants::TournamentId)
                            .col(TournamentParticipants::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournament_participants_tournament_id")
                            .from(
                                TournamentParticipants::Table,
                                TournamentParticipants::TournamentId,
                            )
                            .to(Tournaments::Table, Tournaments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournament_participants_user_id")
                            .from(TournamentParticipants::Table, TournamentParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TournamentParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tournaments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tournaments {
    Table,
    Id,
    Name,
    Date,
    Location,
    MatchType,
    Status,
    OrganizerId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TournamentParticipants {
    Table,
    TournamentId,
    UserId,
    Status,
    TeamName,
    Email,
    InvitedAt,
}
