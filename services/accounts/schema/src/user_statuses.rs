use sea_orm::entity::prelude::*;

use crate::IMMUTABLE_RECORD_MESSAGE;

/// Append-only status ledger. The current status of a user is the row with
/// the highest `id` for that user.
///
/// `status`: 0 = active, 1 = suspended, 2 = deleted.
///
/// Rows are insert-only: the `ActiveModelBehavior` below rejects updates and
/// deletes issued through the entity, and the `user_statuses_immutable`
/// trigger rejects them at the database.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Uuid,
    pub status: i16,
    pub reason: Option<String>,
    pub changed_by_user_id: Option<Uuid>,
    pub effective_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ChangedByUserId",
        to = "super::users::Column::Id"
    )]
    ChangedBy,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            Ok(self)
        } else {
            Err(DbErr::Custom(IMMUTABLE_RECORD_MESSAGE.to_owned()))
        }
    }

    async fn before_delete<C>(self, _db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Err(DbErr::Custom(IMMUTABLE_RECORD_MESSAGE.to_owned()))
    }
}
