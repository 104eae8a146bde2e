use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{prelude::*, progress};
use crate::errors::LedgerError;
use crate::locks::UserLocks;
use progression_core::{find_achievement, find_title, LevelingCurve};
use progression_types::{ProgressRecord, XpGrant, STARTER_TITLE};

/// The Progress Ledger: owns every mutation of a user's XP, level, coins,
/// achievements and titles. All writes for one user run under that user's
/// lock and inside a single transaction, so grants cannot lose updates and
/// compound writes (unlock + reward) cannot surface half-applied.
pub struct ProgressRepository {
    db: DatabaseConnection,
    locks: Arc<UserLocks>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LeaderboardEntry {
    pub record: ProgressRecord,
    pub rank: u32,
}

fn parse_id_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_id_list(ids: &[String]) -> String {
    serde_json::to_string(ids).expect("string list always serializes")
}

fn model_to_record(model: progress::Model) -> ProgressRecord {
    ProgressRecord {
        user_id: model.user_id,
        xp: model.xp,
        level: model.level,
        coins: model.coins,
        achievements: parse_id_list(&model.achievements),
        unlocked_titles: parse_id_list(&model.unlocked_titles),
        active_title: model.active_title,
        weekly_xp: model.weekly_xp,
        monthly_xp: model.monthly_xp,
        is_premium: model.is_premium,
        premium_since: model.premium_since.map(|ts| ts.to_rfc3339()),
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
    }
}

impl ProgressRepository {
    pub fn new(db: DatabaseConnection, locks: Arc<UserLocks>) -> Self {
        Self { db, locks }
    }

    /// Load the row, inserting the default one if absent. A missing record
    /// is a valid state, never an error.
    pub(crate) async fn ensure_exists<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<progress::Model, sea_orm::DbErr> {
        if let Some(model) = Progress::find_by_id(user_id).one(conn).await? {
            return Ok(model);
        }

        let now = chrono::Utc::now().into();
        let starter = vec![STARTER_TITLE.to_string()];
        let fresh = progress::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            xp: ActiveValue::Set(0),
            level: ActiveValue::Set(1),
            coins: ActiveValue::Set(0),
            achievements: ActiveValue::Set("[]".to_string()),
            unlocked_titles: ActiveValue::Set(encode_id_list(&starter)),
            active_title: ActiveValue::Set(Some(STARTER_TITLE.to_string())),
            weekly_xp: ActiveValue::Set(0),
            monthly_xp: ActiveValue::Set(0),
            is_premium: ActiveValue::Set(false),
            premium_since: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        fresh.insert(conn).await
    }

    /// XP grant body, shared with compound operations (achievement unlock,
    /// challenge claim) that run their own transaction. Caller must hold
    /// the user's lock. `level` is only ever written here and in
    /// `reset_progress`, always as `level_from_xp(xp)`.
    pub(crate) async fn grant_xp_in_txn(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: i64,
    ) -> Result<XpGrant, sea_orm::DbErr> {
        let model = Self::ensure_exists(txn, user_id).await?;
        let old_level = model.level;
        let new_xp = model.xp + amount;
        let new_level = LevelingCurve::level_from_xp(new_xp);
        let new_weekly = model.weekly_xp + amount;
        let new_monthly = model.monthly_xp + amount;

        let mut active: progress::ActiveModel = model.into();
        active.xp = ActiveValue::Set(new_xp);
        active.level = ActiveValue::Set(new_level);
        active.weekly_xp = ActiveValue::Set(new_weekly);
        active.monthly_xp = ActiveValue::Set(new_monthly);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(txn).await?;

        let leveled_up = new_level > old_level;
        if leveled_up {
            info!(%user_id, old_level, new_level, "user leveled up");
        }

        Ok(XpGrant {
            new_xp,
            new_level,
            leveled_up,
        })
    }

    pub(crate) async fn add_coins_in_txn(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        amount: i64,
    ) -> Result<i64, sea_orm::DbErr> {
        let model = Self::ensure_exists(txn, user_id).await?;
        let new_balance = model.coins + amount;

        let mut active: progress::ActiveModel = model.into();
        active.coins = ActiveValue::Set(new_balance);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(txn).await?;

        Ok(new_balance)
    }

    pub(crate) async fn unlock_title_in_txn(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        title_id: &str,
    ) -> Result<bool, sea_orm::DbErr> {
        let model = Self::ensure_exists(txn, user_id).await?;
        let mut titles = parse_id_list(&model.unlocked_titles);
        if titles.iter().any(|id| id == title_id) {
            return Ok(false);
        }
        titles.push(title_id.to_string());

        let mut active: progress::ActiveModel = model.into();
        active.unlocked_titles = ActiveValue::Set(encode_id_list(&titles));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(txn).await?;

        info!(%user_id, title_id, "title unlocked");
        Ok(true)
    }

    /// Return the record, lazily creating the default one (level 1, zero
    /// XP/coins, starter title unlocked and active).
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<ProgressRecord, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let model = Self::ensure_exists(&self.db, user_id).await?;
        Ok(model_to_record(model))
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProgressRecord>, LedgerError> {
        let model = Progress::find_by_id(user_id).one(&self.db).await?;
        Ok(model.map(model_to_record))
    }

    /// Add `amount` XP and rederive the level. Weekly and monthly counters
    /// accrue the same amount.
    pub async fn grant_xp(&self, user_id: Uuid, amount: i64) -> Result<XpGrant, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let grant = Self::grant_xp_in_txn(&txn, user_id, amount).await?;
        txn.commit().await?;
        Ok(grant)
    }

    /// Unconditional coin credit. Returns the new balance.
    pub async fn add_coins(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let balance = Self::add_coins_in_txn(&txn, user_id, amount).await?;
        txn.commit().await?;
        Ok(balance)
    }

    /// Debit coins, rejecting without mutation when the balance does not
    /// cover the amount. The balance is never observable below zero.
    pub async fn spend_coins(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let model = Self::ensure_exists(&txn, user_id).await?;
        if model.coins < amount {
            return Err(LedgerError::InsufficientCoins {
                required: amount,
                balance: model.coins,
            });
        }

        let new_balance = model.coins - amount;
        let mut active: progress::ActiveModel = model.into();
        active.coins = ActiveValue::Set(new_balance);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&txn).await?;
        txn.commit().await?;

        Ok(new_balance)
    }

    /// Idempotent unlock: `false` when already unlocked, with no second
    /// reward. Otherwise the id append and the XP reward commit together.
    pub async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement_id: &str,
    ) -> Result<bool, LedgerError> {
        let definition =
            find_achievement(achievement_id).ok_or_else(|| LedgerError::UnknownAchievement {
                achievement_id: achievement_id.to_string(),
            })?;

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let model = Self::ensure_exists(&txn, user_id).await?;

        let mut achievements = parse_id_list(&model.achievements);
        if achievements.iter().any(|id| id == achievement_id) {
            return Ok(false);
        }
        achievements.push(achievement_id.to_string());

        let mut active: progress::ActiveModel = model.into();
        active.achievements = ActiveValue::Set(encode_id_list(&achievements));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        Self::grant_xp_in_txn(&txn, user_id, definition.xp_reward).await?;
        txn.commit().await?;

        info!(%user_id, achievement_id, xp_reward = definition.xp_reward, "achievement unlocked");
        Ok(true)
    }

    /// Idempotent title unlock; `false` when already present.
    pub async fn unlock_title(&self, user_id: Uuid, title_id: &str) -> Result<bool, LedgerError> {
        if find_title(title_id).is_none() {
            return Err(LedgerError::UnknownTitle {
                title_id: title_id.to_string(),
            });
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let unlocked = Self::unlock_title_in_txn(&txn, user_id, title_id).await?;
        txn.commit().await?;
        Ok(unlocked)
    }

    /// Point `active_title` at an unlocked title, or clear it with `None`.
    /// Returns `false` without mutating when the title is not unlocked.
    pub async fn set_active_title(
        &self,
        user_id: Uuid,
        title_id: Option<&str>,
    ) -> Result<bool, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let model = Self::ensure_exists(&self.db, user_id).await?;

        if let Some(title_id) = title_id {
            let titles = parse_id_list(&model.unlocked_titles);
            if !titles.iter().any(|id| id == title_id) {
                return Ok(false);
            }
        }

        let mut active: progress::ActiveModel = model.into();
        active.active_title = ActiveValue::Set(title_id.map(str::to_string));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Admin reset: XP/level/coins zeroed, achievements cleared, titles
    /// back to the starter. Premium fields and identity are preserved.
    pub async fn reset_progress(&self, user_id: Uuid) -> Result<ProgressRecord, LedgerError> {
        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;
        let model = Self::ensure_exists(&txn, user_id).await?;

        let starter = vec![STARTER_TITLE.to_string()];
        let mut active: progress::ActiveModel = model.into();
        active.xp = ActiveValue::Set(0);
        active.level = ActiveValue::Set(1);
        active.coins = ActiveValue::Set(0);
        active.achievements = ActiveValue::Set("[]".to_string());
        active.unlocked_titles = ActiveValue::Set(encode_id_list(&starter));
        active.active_title = ActiveValue::Set(Some(STARTER_TITLE.to_string()));
        active.weekly_xp = ActiveValue::Set(0);
        active.monthly_xp = ActiveValue::Set(0);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(%user_id, "progress reset by admin");
        Ok(model_to_record(updated))
    }

    /// Scheduler-driven full-field reset of every weekly counter.
    pub async fn reset_weekly_xp(&self) -> Result<u64, LedgerError> {
        let result = Progress::update_many()
            .col_expr(progress::Column::WeeklyXp, sea_orm::sea_query::Expr::value(0))
            .exec(&self.db)
            .await?;
        info!(rows = result.rows_affected, "weekly XP counters reset");
        Ok(result.rows_affected)
    }

    /// Scheduler-driven full-field reset of every monthly counter.
    pub async fn reset_monthly_xp(&self) -> Result<u64, LedgerError> {
        let result = Progress::update_many()
            .col_expr(
                progress::Column::MonthlyXp,
                sea_orm::sea_query::Expr::value(0),
            )
            .exec(&self.db)
            .await?;
        info!(rows = result.rows_affected, "monthly XP counters reset");
        Ok(result.rows_affected)
    }

    pub async fn get_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let rows = Progress::find()
            .order_by_desc(progress::Column::Xp)
            .limit(limit)
            .all(&self.db)
            .await?;

        let leaderboard = rows
            .into_iter()
            .enumerate()
            .map(|(index, model)| LeaderboardEntry {
                record: model_to_record(model),
                rank: (index + 1) as u32,
            })
            .collect();

        Ok(leaderboard)
    }

    pub async fn get_user_rank(&self, user_id: Uuid) -> Result<Option<u32>, LedgerError> {
        let row = Progress::find_by_id(user_id).one(&self.db).await?;

        if let Some(model) = row {
            let users_above = Progress::find()
                .filter(progress::Column::Xp.gt(model.xp))
                .count(&self.db)
                .await?;
            Ok(Some(users_above as u32 + 1))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use progression_core::FIRST_GOAL;

    async fn setup_test_repo() -> ProgressRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        ProgressRepository::new(db, Arc::new(UserLocks::new()))
    }

    #[tokio::test]
    async fn test_get_or_create_defaults() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.xp, 0);
        assert_eq!(record.level, 1);
        assert_eq!(record.coins, 0);
        assert!(record.achievements.is_empty());
        assert_eq!(record.unlocked_titles, vec![STARTER_TITLE.to_string()]);
        assert_eq!(record.active_title.as_deref(), Some(STARTER_TITLE));

        // Second call returns the same record, not a fresh one
        repo.grant_xp(user_id, 10).await.unwrap();
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.xp, 10);
    }

    #[tokio::test]
    async fn test_grant_xp_is_additive() {
        let repo = setup_test_repo().await;
        let split = Uuid::new_v4();
        let single = Uuid::new_v4();

        repo.grant_xp(split, 40).await.unwrap();
        repo.grant_xp(split, 35).await.unwrap();
        repo.grant_xp(single, 75).await.unwrap();

        let split_record = repo.get_or_create(split).await.unwrap();
        let single_record = repo.get_or_create(single).await.unwrap();
        assert_eq!(split_record.xp, single_record.xp);
        assert_eq!(split_record.level, single_record.level);
        assert_eq!(split_record.weekly_xp, 75);
        assert_eq!(split_record.monthly_xp, 75);
    }

    #[tokio::test]
    async fn test_level_transition_at_threshold() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        let grant = repo.grant_xp(user_id, 99).await.unwrap();
        assert_eq!(grant.new_level, 1);
        assert!(!grant.leveled_up);

        let grant = repo.grant_xp(user_id, 1).await.unwrap();
        assert_eq!(grant.new_xp, 100);
        assert_eq!(grant.new_level, 2);
        assert!(grant.leveled_up);

        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.level, 2);
    }

    #[tokio::test]
    async fn test_concurrent_grants_do_not_lose_updates() {
        let repo = Arc::new(setup_test_repo().await);
        let user_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = repo.clone();
            handles.push(tokio::spawn(
                async move { repo.grant_xp(user_id, 10).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.xp, 100);
        assert_eq!(record.level, 2);
    }

    #[tokio::test]
    async fn test_grant_rejects_negative_amount() {
        let repo = setup_test_repo().await;
        let result = repo.grant_xp(Uuid::new_v4(), -5).await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
    }

    #[tokio::test]
    async fn test_spend_coins_insufficient_funds() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        repo.add_coins(user_id, 10).await.unwrap();

        let result = repo.spend_coins(user_id, 25).await;
        match result {
            Err(LedgerError::InsufficientCoins { required, balance }) => {
                assert_eq!(required, 25);
                assert_eq!(balance, 10);
            }
            other => panic!("expected InsufficientCoins, got {:?}", other),
        }

        // Balance unchanged after the rejected spend
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.coins, 10);

        let balance = repo.spend_coins(user_id, 10).await.unwrap();
        assert_eq!(balance, 0);
    }

    #[tokio::test]
    async fn test_unlock_achievement_is_idempotent() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        let first = repo.unlock_achievement(user_id, FIRST_GOAL).await.unwrap();
        assert!(first);

        let second = repo.unlock_achievement(user_id, FIRST_GOAL).await.unwrap();
        assert!(!second);

        // Reward granted exactly once: first_goal pays 50 XP
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.xp, 50);
        assert_eq!(record.achievements, vec![FIRST_GOAL.to_string()]);
    }

    #[tokio::test]
    async fn test_unlock_unknown_achievement() {
        let repo = setup_test_repo().await;
        let result = repo.unlock_achievement(Uuid::new_v4(), "no_such_badge").await;
        assert!(matches!(
            result,
            Err(LedgerError::UnknownAchievement { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_active_title_requires_unlock() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();
        repo.get_or_create(user_id).await.unwrap();

        // Not unlocked yet: rejected, active title unchanged
        let changed = repo
            .set_active_title(user_id, Some("veteran"))
            .await
            .unwrap();
        assert!(!changed);
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.active_title.as_deref(), Some(STARTER_TITLE));

        repo.unlock_title(user_id, "veteran").await.unwrap();
        let changed = repo
            .set_active_title(user_id, Some("veteran"))
            .await
            .unwrap();
        assert!(changed);
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.active_title.as_deref(), Some("veteran"));

        // Clearing is always allowed
        let changed = repo.set_active_title(user_id, None).await.unwrap();
        assert!(changed);
        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.active_title, None);
    }

    #[tokio::test]
    async fn test_reset_progress_preserves_premium() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        repo.grant_xp(user_id, 500).await.unwrap();
        repo.add_coins(user_id, 40).await.unwrap();
        repo.unlock_achievement(user_id, FIRST_GOAL).await.unwrap();
        repo.unlock_title(user_id, "veteran").await.unwrap();

        // Flag premium out of band, as the billing webhook would
        let model = Progress::find_by_id(user_id)
            .one(&repo.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: progress::ActiveModel = model.into();
        active.is_premium = ActiveValue::Set(true);
        active.update(&repo.db).await.unwrap();

        let record = repo.reset_progress(user_id).await.unwrap();
        assert_eq!(record.xp, 0);
        assert_eq!(record.level, 1);
        assert_eq!(record.coins, 0);
        assert!(record.achievements.is_empty());
        assert_eq!(record.unlocked_titles, vec![STARTER_TITLE.to_string()]);
        assert_eq!(record.active_title.as_deref(), Some(STARTER_TITLE));
        assert!(record.is_premium);
    }

    #[tokio::test]
    async fn test_weekly_reset_clears_counters_only() {
        let repo = setup_test_repo().await;
        let user_id = Uuid::new_v4();

        repo.grant_xp(user_id, 120).await.unwrap();
        let rows = repo.reset_weekly_xp().await.unwrap();
        assert_eq!(rows, 1);

        let record = repo.get_or_create(user_id).await.unwrap();
        assert_eq!(record.weekly_xp, 0);
        assert_eq!(record.monthly_xp, 120);
        assert_eq!(record.xp, 120);
    }

    #[tokio::test]
    async fn test_leaderboard_and_rank() {
        let repo = setup_test_repo().await;
        let low = Uuid::new_v4();
        let mid = Uuid::new_v4();
        let high = Uuid::new_v4();

        repo.grant_xp(low, 50).await.unwrap();
        repo.grant_xp(mid, 150).await.unwrap();
        repo.grant_xp(high, 400).await.unwrap();

        let leaderboard = repo.get_leaderboard(10).await.unwrap();
        assert_eq!(leaderboard.len(), 3);
        assert_eq!(leaderboard[0].record.user_id, high);
        assert_eq!(leaderboard[0].rank, 1);
        assert_eq!(leaderboard[2].record.user_id, low);

        assert_eq!(repo.get_user_rank(mid).await.unwrap(), Some(2));
        assert_eq!(repo.get_user_rank(Uuid::new_v4()).await.unwrap(), None);

        let top_two = repo.get_leaderboard(2).await.unwrap();
        assert_eq!(top_two.len(), 2);
    }
}
