use sea_orm::entity::prelude::*;

/// Identity anchor. Credential, profile and status ledger all hang off `id`
/// and are removed with it (`ON DELETE CASCADE`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_credentials::Entity")]
    Credential,
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    Profile,
    #[sea_orm(has_many = "super::user_statuses::Entity")]
    Statuses,
}

impl Related<super::user_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credential.def()
    }
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::user_statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
