use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Progress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Progress::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Progress::Xp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Progress::Level)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Progress::Coins)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Progress::Achievements)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Progress::UnlockedTitles)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Progress::ActiveTitle).string().null())
                    .col(
                        ColumnDef::new(Progress::WeeklyXp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Progress::MonthlyXp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Progress::IsPremium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Progress::PremiumSince)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Progress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Progress::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on xp for leaderboard queries
        manager
            .create_index(
                Index::create()
                    .name("idx_progress_xp")
                    .table(Progress::Table)
                    .col(Progress::Xp)
                    .to_owned(),
            )
            .await?;

        // Create index on weekly_xp for weekly leaderboard queries
        manager
            .create_index(
                Index::create()
                    .name("idx_progress_weekly_xp")
                    .table(Progress::Table)
                    .col(Progress::WeeklyXp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Progress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Progress {
    Table,
    UserId,
    Xp,
    Level,
    Coins,
    Achievements,
    UnlockedTitles,
    ActiveTitle,
    WeeklyXp,
    MonthlyXp,
    IsPremium,
    PremiumSince,
    CreatedAt,
    UpdatedAt,
}
