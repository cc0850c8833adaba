pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_friendships_table;
mod m20240101_000003_create_teams_and_matches_tables;
mod m20240101_000004_create_groups_tables;
mod m20240101_000005_create_tournaments_tables;
mod m20240101_000006_create_badges_and_settings_tables;
mod m20240101_000007_create_announcements_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_friendships_table::Migration),
            Box::new(m20240101_000003_create_teams_and_matches_tables::Migration),
            Box::new(m20240101_000004_create_groups_tables::Migration),
            Box::new(m20240101_000005_create_tournaments_tables::Migration),
            Box::new(m20240101_000006_create_badges_and_settings_tables::Migration),
            Box::new(m20240101_000007_create_announcements_table::Migration),
        ]
    }
}
