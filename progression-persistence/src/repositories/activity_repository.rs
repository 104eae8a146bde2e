use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::{daily_activity, prelude::*};
use crate::locks::UserLocks;
use progression_core::{aggregate_user_stats, format_activity_for_calendar, DATE_FORMAT};
use progression_types::{ActivityKind, CalendarDay, DailyActivity, UserStats};

/// Aggregates one row per user-day for the calendar heatmap and the stats
/// snapshots the achievement evaluator consumes.
pub struct ActivityRepository {
    db: DatabaseConnection,
    locks: Arc<UserLocks>,
}

fn model_to_activity(model: daily_activity::Model) -> DailyActivity {
    DailyActivity {
        user_id: model.user_id,
        date: model.date,
        tasks_completed: model.tasks_completed,
        goals_completed: model.goals_completed,
        events_created: model.events_created,
        xp_earned: model.xp_earned,
        coins_earned: model.coins_earned,
    }
}

impl ActivityRepository {
    pub fn new(db: DatabaseConnection, locks: Arc<UserLocks>) -> Self {
        Self { db, locks }
    }

    /// Record one action for today. See `record_for_date`.
    pub async fn record_daily_activity(
        &self,
        user_id: Uuid,
        kind: ActivityKind,
        xp_earned: i64,
        coins_earned: i64,
    ) -> Result<DailyActivity> {
        self.record_for_date(user_id, Local::now().date_naive(), kind, xp_earned, coins_earned)
            .await
    }

    /// Upsert keyed `(user, date)`: the first action of the day seeds the
    /// matching counter at 1; later actions increment only that counter and
    /// add the rewards to the running totals. Counters never decrement.
    pub async fn record_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        kind: ActivityKind,
        xp_earned: i64,
        coins_earned: i64,
    ) -> Result<DailyActivity> {
        let _guard = self.locks.acquire(user_id).await;
        let date = date.format(DATE_FORMAT).to_string();
        let now = chrono::Utc::now().into();

        let existing = DailyActivities::find_by_id((user_id, date.clone()))
            .one(&self.db)
            .await?;

        let model = match existing {
            None => {
                let fresh = daily_activity::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    date: ActiveValue::Set(date),
                    tasks_completed: ActiveValue::Set((kind == ActivityKind::Task) as i32),
                    goals_completed: ActiveValue::Set((kind == ActivityKind::Goal) as i32),
                    events_created: ActiveValue::Set((kind == ActivityKind::Event) as i32),
                    xp_earned: ActiveValue::Set(xp_earned),
                    coins_earned: ActiveValue::Set(coins_earned),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                };
                fresh.insert(&self.db).await?
            }
            Some(model) => {
                let tasks = model.tasks_completed + (kind == ActivityKind::Task) as i32;
                let goals = model.goals_completed + (kind == ActivityKind::Goal) as i32;
                let events = model.events_created + (kind == ActivityKind::Event) as i32;
                let xp = model.xp_earned + xp_earned;
                let coins = model.coins_earned + coins_earned;

                let mut active: daily_activity::ActiveModel = model.into();
                active.tasks_completed = ActiveValue::Set(tasks);
                active.goals_completed = ActiveValue::Set(goals);
                active.events_created = ActiveValue::Set(events);
                active.xp_earned = ActiveValue::Set(xp);
                active.coins_earned = ActiveValue::Set(coins);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.db).await?
            }
        };

        Ok(model_to_activity(model))
    }

    /// All rows in the `days`-day window ending `today`, oldest first.
    pub async fn get_recent(
        &self,
        user_id: Uuid,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyActivity>> {
        let cutoff = (today - chrono::Duration::days(days.saturating_sub(1) as i64))
            .format(DATE_FORMAT)
            .to_string();

        // Zero-padded ISO dates compare correctly as strings
        let rows = DailyActivities::find()
            .filter(daily_activity::Column::UserId.eq(user_id))
            .filter(daily_activity::Column::Date.gte(cutoff))
            .order_by_asc(daily_activity::Column::Date)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(model_to_activity).collect())
    }

    /// Dense calendar series for the heatmap.
    pub async fn get_calendar(
        &self,
        user_id: Uuid,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<CalendarDay>> {
        let activities = self.get_recent(user_id, days, today).await?;
        Ok(format_activity_for_calendar(&activities, days, today))
    }

    /// Fold the user's whole activity history into a stats snapshot.
    pub async fn compute_user_stats(&self, user_id: Uuid, today: NaiveDate) -> Result<UserStats> {
        let rows = DailyActivities::find()
            .filter(daily_activity::Column::UserId.eq(user_id))
            .order_by_asc(daily_activity::Column::Date)
            .all(&self.db)
            .await?;

        let activities: Vec<DailyActivity> = rows.into_iter().map(model_to_activity).collect();
        Ok(aggregate_user_stats(&activities, today))
    }
}
