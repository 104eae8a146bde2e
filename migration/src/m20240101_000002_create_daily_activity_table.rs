use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyActivity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyActivity::UserId).uuid().not_null())
                    .col(ColumnDef::new(DailyActivity::Date).string().not_null())
                    .col(
                        ColumnDef::new(DailyActivity::TasksCompleted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::GoalsCompleted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::EventsCreated)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::XpEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::CoinsEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DailyActivity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(DailyActivity::UserId)
                            .col(DailyActivity::Date),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on date for calendar range queries
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_activity_date")
                    .table(DailyActivity::Table)
                    .col(DailyActivity::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyActivity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyActivity {
    Table,
    UserId,
    Date,
    TasksCompleted,
    GoalsCompleted,
    EventsCreated,
    XpEarned,
    CoinsEarned,
    CreatedAt,
    UpdatedAt,
}
