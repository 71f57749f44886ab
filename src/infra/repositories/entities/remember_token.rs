//! Remember-me token entity. Only the SHA-1 fingerprint of the raw token is stored.

use sea_orm::entity::prelude::*;

use crate::domain::remember::StoredToken;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "remember_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub fingerprint: String,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredToken {
    fn from(model: Model) -> Self {
        StoredToken {
            id: model.id,
            user_id: model.user_id,
            fingerprint: model.fingerprint,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}
