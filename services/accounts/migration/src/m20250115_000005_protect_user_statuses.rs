use inkpost_accounts_schema::IMMUTABLE_RECORD_MESSAGE;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// UPDATE is always rejected. DELETE is rejected unless the owning user row is
// already gone, which is the case only for the ON DELETE CASCADE from `users`.
fn create_function_sql() -> String {
    format!(
        r#"
CREATE OR REPLACE FUNCTION user_statuses_reject_mutation() RETURNS trigger AS $$
BEGIN
    IF TG_OP = 'DELETE' AND NOT EXISTS (SELECT 1 FROM users WHERE id = OLD.user_id) THEN
        RETURN OLD;
    END IF;
    RAISE EXCEPTION '{IMMUTABLE_RECORD_MESSAGE}' USING ERRCODE = 'restrict_violation';
END;
$$ LANGUAGE plpgsql;
"#
    )
}

const CREATE_TRIGGER: &str = r#"
CREATE TRIGGER user_statuses_immutable
    BEFORE UPDATE OR DELETE ON user_statuses
    FOR EACH ROW EXECUTE FUNCTION user_statuses_reject_mutation();
"#;

const DROP_TRIGGER: &str = r#"
DROP TRIGGER IF EXISTS user_statuses_immutable ON user_statuses;
DROP FUNCTION IF EXISTS user_statuses_reject_mutation();
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&create_function_sql()).await?;
        db.execute_unprepared(CREATE_TRIGGER).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DROP_TRIGGER)
            .await?;
        Ok(())
    }
}
