use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{prelude::*, weekly_challenge};
use crate::errors::ClaimError;
use crate::locks::UserLocks;
use crate::repositories::ProgressRepository;
use progression_core::{
    challenge_from_pool, generate_weekly_challenges, update_challenge_progress, week_bounds,
    CHALLENGE_POOL,
};
use progression_types::{Challenge, ChallengeType, ClaimedReward};

/// Weekly challenge store. The set for a week is generated once per
/// `(user, week_start)` and reloaded on every later read; regeneration
/// never runs mid-week.
pub struct ChallengeRepository {
    db: DatabaseConnection,
    locks: Arc<UserLocks>,
}

fn pool_index_from_id(challenge_id: &str) -> Option<usize> {
    challenge_id.rsplit('_').next()?.parse().ok()
}

fn week_start_from_millis(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

fn model_to_challenge(model: &weekly_challenge::Model) -> Option<Challenge> {
    let week_start = week_start_from_millis(model.week_start)?;
    challenge_from_pool(
        model.pool_index as usize,
        week_start,
        model.current,
        model.completed,
        model.claimed_at.is_some(),
    )
}

impl ChallengeRepository {
    pub fn new(db: DatabaseConnection, locks: Arc<UserLocks>) -> Self {
        Self { db, locks }
    }

    async fn week_rows(
        &self,
        user_id: Uuid,
        week_start_millis: i64,
    ) -> Result<Vec<weekly_challenge::Model>, sea_orm::DbErr> {
        WeeklyChallenges::find()
            .filter(weekly_challenge::Column::UserId.eq(user_id))
            .filter(weekly_challenge::Column::WeekStart.eq(week_start_millis))
            .order_by_asc(weekly_challenge::Column::PoolIndex)
            .all(&self.db)
            .await
    }

    /// Insert this week's generated set if no rows exist yet. Caller must
    /// hold the user's lock.
    async fn generate_if_missing(
        &self,
        user_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Vec<weekly_challenge::Model>> {
        let (week_start, _) = week_bounds(now);
        let millis = week_start.timestamp_millis();

        let existing = self.week_rows(user_id, millis).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let generated = generate_weekly_challenges(now, &mut rand::thread_rng())?;
        let created_at: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        // All four rows land together or not at all
        let txn = self.db.begin().await?;
        for challenge in &generated {
            let pool_index = pool_index_from_id(&challenge.id)
                .ok_or_else(|| anyhow::anyhow!("malformed challenge id {}", challenge.id))?;
            let row = weekly_challenge::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                id: ActiveValue::Set(challenge.id.clone()),
                week_start: ActiveValue::Set(millis),
                pool_index: ActiveValue::Set(pool_index as i32),
                challenge_type: ActiveValue::Set(challenge.challenge_type.as_str().to_string()),
                target: ActiveValue::Set(challenge.target),
                current: ActiveValue::Set(0),
                completed: ActiveValue::Set(false),
                claimed_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(created_at),
                updated_at: ActiveValue::Set(created_at),
            };
            row.insert(&txn).await?;
        }
        txn.commit().await?;

        info!(%user_id, week_start = millis, "weekly challenge set generated");
        self.week_rows(user_id, millis).await.map_err(Into::into)
    }

    /// The user's challenge set for the week containing `now`, generating
    /// and persisting it on first read.
    pub async fn get_or_generate(
        &self,
        user_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Vec<Challenge>> {
        let (week_start, _) = week_bounds(now);
        let rows = self.week_rows(user_id, week_start.timestamp_millis()).await?;

        let rows = if rows.is_empty() {
            let _guard = self.locks.acquire(user_id).await;
            self.generate_if_missing(user_id, now).await?
        } else {
            rows
        };

        Ok(rows.iter().filter_map(model_to_challenge).collect())
    }

    /// Apply progress of `challenge_type` to this week's non-completed
    /// matching challenges; `current` clamps at `target` and completed
    /// instances are frozen. Returns the refreshed set.
    pub async fn record_progress(
        &self,
        user_id: Uuid,
        challenge_type: ChallengeType,
        increment: i32,
        now: DateTime<Local>,
    ) -> Result<Vec<Challenge>> {
        let _guard = self.locks.acquire(user_id).await;
        let rows = self.generate_if_missing(user_id, now).await?;

        // Pair each row with its rehydrated instance so rows whose pool
        // index is no longer recognized drop out of both sides
        let (rows, mut challenges): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .filter_map(|row| model_to_challenge(&row).map(|challenge| (row, challenge)))
            .unzip();
        update_challenge_progress(&mut challenges, challenge_type, increment);

        let txn = self.db.begin().await?;
        for (row, challenge) in rows.into_iter().zip(challenges.iter()) {
            if row.current == challenge.current && row.completed == challenge.completed {
                continue;
            }
            if challenge.completed && !row.completed {
                info!(%user_id, challenge_id = %challenge.id, "challenge completed");
            }
            let mut active: weekly_challenge::ActiveModel = row.into();
            active.current = ActiveValue::Set(challenge.current);
            active.completed = ActiveValue::Set(challenge.completed);
            active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
            active.update(&txn).await?;
        }
        txn.commit().await?;

        Ok(challenges)
    }

    /// Raise streak-type challenge progress to the current streak value.
    /// Monotone: never lowers `current`, clamps at `target`, frozen once
    /// completed.
    pub async fn sync_streak(
        &self,
        user_id: Uuid,
        streak: u32,
        now: DateTime<Local>,
    ) -> Result<Vec<Challenge>> {
        let _guard = self.locks.acquire(user_id).await;
        let rows = self.generate_if_missing(user_id, now).await?;
        let streak_type = ChallengeType::Streak.as_str();

        let txn = self.db.begin().await?;
        let mut refreshed = Vec::with_capacity(rows.len());
        for row in rows {
            if row.challenge_type == streak_type && !row.completed {
                let current = (streak as i32).clamp(row.current, row.target);
                if current != row.current {
                    let completed = current >= row.target;
                    if completed {
                        info!(%user_id, challenge_id = %row.id, "challenge completed");
                    }
                    let mut active: weekly_challenge::ActiveModel = row.clone().into();
                    active.current = ActiveValue::Set(current);
                    active.completed = ActiveValue::Set(completed);
                    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
                    let updated = active.update(&txn).await?;
                    refreshed.push(updated);
                    continue;
                }
            }
            refreshed.push(row);
        }
        txn.commit().await?;

        Ok(refreshed.iter().filter_map(model_to_challenge).collect())
    }

    /// Exactly-once claim: marks `claimed_at` and pays the reward through
    /// the ledger in one transaction. Failure reasons are distinct so the
    /// dashboard can message each case; a retry after a successful claim
    /// short-circuits on `AlreadyClaimed`.
    pub async fn claim(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> Result<ClaimedReward, ClaimError> {
        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;

        let row = WeeklyChallenges::find_by_id((user_id, challenge_id.to_string()))
            .one(&txn)
            .await?
            .ok_or_else(|| ClaimError::NotFound {
                challenge_id: challenge_id.to_string(),
            })?;

        if !row.completed {
            return Err(ClaimError::NotCompleted {
                challenge_id: challenge_id.to_string(),
            });
        }
        if row.claimed_at.is_some() {
            return Err(ClaimError::AlreadyClaimed {
                challenge_id: challenge_id.to_string(),
            });
        }

        let template = CHALLENGE_POOL
            .get(row.pool_index as usize)
            .ok_or_else(|| ClaimError::NotFound {
                challenge_id: challenge_id.to_string(),
            })?;

        let mut active: weekly_challenge::ActiveModel = row.into();
        active.claimed_at = ActiveValue::Set(Some(chrono::Utc::now().into()));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        let grant = ProgressRepository::grant_xp_in_txn(&txn, user_id, template.reward_xp).await?;
        ProgressRepository::add_coins_in_txn(&txn, user_id, template.reward_coins).await?;
        if let Some(title_id) = template.reward_title {
            ProgressRepository::unlock_title_in_txn(&txn, user_id, title_id).await?;
        }
        txn.commit().await?;

        info!(
            %user_id,
            challenge_id,
            xp = template.reward_xp,
            coins = template.reward_coins,
            "challenge reward claimed"
        );

        Ok(ClaimedReward {
            challenge_id: challenge_id.to_string(),
            xp: template.reward_xp,
            coins: template.reward_coins,
            title: template.reward_title.map(str::to_string),
            new_xp: grant.new_xp,
            new_level: grant.new_level,
            leveled_up: grant.leveled_up,
        })
    }
}
