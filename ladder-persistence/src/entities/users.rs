use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub auth_uid: Option<String>,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub dupr_id: Option<String>,
    pub dupr_rating: Option<f64>,
    pub is_admin: bool,
    pub is_ghost: bool,
    pub email_verified: bool,
    pub dark_mode: bool,
    pub profile_picture_url: Option<String>,
    pub profile_picture_thumbnail_url: Option<String>,
    pub wins: i32,
    pub losses: i32,
    pub current_streak: i32,
    pub streak_type: Option<String>,
    pub last_match_recorded_type: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
