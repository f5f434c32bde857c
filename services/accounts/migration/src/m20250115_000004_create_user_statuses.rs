use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserStatuses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserStatuses::UserId).uuid().not_null())
                    // 0 = active, 1 = suspended, 2 = deleted
                    .col(
                        ColumnDef::new(UserStatuses::Status)
                            .small_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(UserStatuses::Status).between(0, 2)),
                    )
                    .col(ColumnDef::new(UserStatuses::Reason).text())
                    .col(ColumnDef::new(UserStatuses::ChangedByUserId).uuid())
                    .col(
                        ColumnDef::new(UserStatuses::EffectiveAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserStatuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserStatuses::Table, UserStatuses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserStatuses::Table, UserStatuses::ChangedByUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserStatuses::Table)
                    .col(UserStatuses::UserId)
                    .name("idx_user_statuses_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserStatuses::Table)
                    .col(UserStatuses::UserId)
                    .col(UserStatuses::EffectiveAt)
                    .name("idx_user_statuses_user_id_effective_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserStatuses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserStatuses {
    Table,
    Id,
    UserId,
    Status,
    Reason,
    ChangedByUserId,
    EffectiveAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
