use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::Config;
use crate::evaluator::AchievementEvaluator;
use progression_persistence::errors::ClaimError;
use progression_persistence::locks::UserLocks;
use progression_persistence::repositories::{
    ActivityRepository, ChallengeRepository, ProgressRepository,
};
use progression_types::{
    ActivityKind, Challenge, ChallengeType, ClaimedReward, UserStats, XpGrant,
};

/// Everything one user action produced, returned to the dashboard in a
/// single response.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActionOutcome {
    pub grant: XpGrant,
    pub coins: i64,
    pub unlocked_achievements: Vec<String>,
    pub stats: UserStats,
    pub challenges: Vec<Challenge>,
}

/// Composition root for the progression flow: one user action fans out to
/// the activity recorder, the ledger, the achievement evaluator, and the
/// weekly challenge stream.
pub struct ProgressionEngine {
    config: Config,
    ledger: Arc<ProgressRepository>,
    challenges: Arc<ChallengeRepository>,
    activity: Arc<ActivityRepository>,
    evaluator: AchievementEvaluator,
}

impl ProgressionEngine {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        let locks = Arc::new(UserLocks::new());
        let ledger = Arc::new(ProgressRepository::new(db.clone(), locks.clone()));
        let challenges = Arc::new(ChallengeRepository::new(db.clone(), locks.clone()));
        let activity = Arc::new(ActivityRepository::new(db, locks));
        let evaluator = AchievementEvaluator::new(ledger.clone());

        Self {
            config,
            ledger,
            challenges,
            activity,
            evaluator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<ProgressRepository> {
        &self.ledger
    }

    pub fn challenges(&self) -> &Arc<ChallengeRepository> {
        &self.challenges
    }

    pub fn activity(&self) -> &Arc<ActivityRepository> {
        &self.activity
    }

    /// Apply one completed task/goal/created event: log the day's tally,
    /// grant XP and coins, re-check achievements against fresh stats, and
    /// advance this week's matching challenges.
    pub async fn record_action(
        &self,
        user_id: Uuid,
        kind: ActivityKind,
    ) -> Result<ActionOutcome> {
        let (xp_reward, coin_reward) = self.config.rewards_for(kind);
        let now = Local::now();

        self.activity
            .record_daily_activity(user_id, kind, xp_reward, coin_reward)
            .await?;
        let grant = self.ledger.grant_xp(user_id, xp_reward).await?;
        let coins = self.ledger.add_coins(user_id, coin_reward).await?;

        let stats = self
            .activity
            .compute_user_stats(user_id, now.date_naive())
            .await?;
        let unlocked_achievements = self.evaluator.check_achievements(user_id, &stats).await?;

        let challenge_type = match kind {
            ActivityKind::Task => ChallengeType::Tasks,
            ActivityKind::Goal => ChallengeType::Goals,
            ActivityKind::Event => ChallengeType::Events,
        };
        self.challenges
            .record_progress(user_id, challenge_type, 1, now)
            .await?;
        let challenges = self
            .challenges
            .sync_streak(user_id, stats.current_streak, now)
            .await?;

        Ok(ActionOutcome {
            grant,
            coins,
            unlocked_achievements,
            stats,
            challenges,
        })
    }

    /// Daily login ping from the session layer; advances login-type
    /// challenges. Callers are expected to send at most one per day.
    pub async fn record_login(&self, user_id: Uuid) -> Result<Vec<Challenge>> {
        self.challenges
            .record_progress(user_id, ChallengeType::Login, 1, Local::now())
            .await
    }

    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        self.activity
            .compute_user_stats(user_id, Local::now().date_naive())
            .await
    }

    pub async fn weekly_challenges(&self, user_id: Uuid) -> Result<Vec<Challenge>> {
        self.challenges
            .get_or_generate(user_id, Local::now())
            .await
    }

    pub async fn claim_challenge(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> Result<ClaimedReward, ClaimError> {
        self.challenges.claim(user_id, challenge_id).await
    }
}
