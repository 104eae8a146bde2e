use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WeeklyChallenges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WeeklyChallenges::UserId).uuid().not_null())
                    .col(ColumnDef::new(WeeklyChallenges::Id).string().not_null())
                    .col(
                        ColumnDef::new(WeeklyChallenges::WeekStart)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::PoolIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::ChallengeType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::Target)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::Current)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WeeklyChallenges::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(WeeklyChallenges::UserId)
                            .col(WeeklyChallenges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on (user_id, week_start) for the weekly set lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_weekly_challenges_user_week")
                    .table(WeeklyChallenges::Table)
                    .col(WeeklyChallenges::UserId)
                    .col(WeeklyChallenges::WeekStart)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WeeklyChallenges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WeeklyChallenges {
    Table,
    UserId,
    Id,
    WeekStart,
    PoolIndex,
    ChallengeType,
    Target,
    Current,
    Completed,
    ClaimedAt,
    CreatedAt,
    UpdatedAt,
}
