use sea_orm_migration::prelude::*;

mod m20250115_000001_create_users;
mod m20250115_000002_create_user_credentials;
mod m20250115_000003_create_user_profiles;
mod m20250115_000004_create_user_statuses;
mod m20250115_000005_protect_user_statuses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250115_000001_create_users::Migration),
            Box::new(m20250115_000002_create_user_credentials::Migration),
            Box::new(m20250115_000003_create_user_profiles::Migration),
            Box::new(m20250115_000004_create_user_statuses::Migration),
            Box::new(m20250115_000005_protect_user_statuses::Migration),
        ]
    }
}
