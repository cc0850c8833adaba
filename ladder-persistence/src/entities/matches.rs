use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub match_type: String,
    pub team1_player1_id: Uuid,
    pub team1_player2_id: Option<Uuid>,
    pub team2_player1_id: Uuid,
    pub team2_player2_id: Option<Uuid>,
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner: String,
    pub is_upset: bool,
    pub match_date: DateTimeUtc,
    pub group_id: Option<Uuid>,
    pub tournament_id: Option<Uuid>,
    pub status: String,
    pub recorded_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
