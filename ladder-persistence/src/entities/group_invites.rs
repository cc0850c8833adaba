use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_invites")]
pub struct Model {
    /// SHA-256 of the token mailed to the invitee, hex encoded.
    #[sea_orm(primary_key, auto_increment = false)]
    pub token_hash: String,
    pub group_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub inviter_id: Uuid,
    pub used: bool,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub last_error: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
