use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use progression_core::{newly_qualified_achievements, newly_qualified_titles};
use progression_persistence::errors::LedgerError;
use progression_persistence::repositories::ProgressRepository;
use progression_types::UserStats;

/// Re-checks unlock conditions against a fresh stats snapshot and pushes
/// unlocks through the ledger. Safe to call after every qualifying action;
/// already-unlocked entries are cheap no-ops.
pub struct AchievementEvaluator {
    ledger: Arc<ProgressRepository>,
}

impl AchievementEvaluator {
    pub fn new(ledger: Arc<ProgressRepository>) -> Self {
        Self { ledger }
    }

    /// Unlock every not-yet-unlocked achievement whose condition `stats`
    /// satisfies, in catalog order, and return the newly unlocked ids.
    ///
    /// Reward XP can itself satisfy further conditions (level tiers, the
    /// unlocked-count badge), so evaluation repeats against the refreshed
    /// record until a pass unlocks nothing. Unlocks lost to a concurrent
    /// racer report `false` from the ledger and are dropped from the
    /// result.
    pub async fn check_achievements(
        &self,
        user_id: Uuid,
        stats: &UserStats,
    ) -> Result<Vec<String>, LedgerError> {
        let mut newly_unlocked = Vec::new();

        loop {
            let record = self.ledger.get_or_create(user_id).await?;
            let qualified = newly_qualified_achievements(&record, stats);
            if qualified.is_empty() {
                break;
            }

            let mut unlocked_this_pass = false;
            for definition in qualified {
                if self.ledger.unlock_achievement(user_id, &definition.id).await? {
                    newly_unlocked.push(definition.id);
                    unlocked_this_pass = true;
                }
            }
            if !unlocked_this_pass {
                break;
            }
        }

        // Titles ride along on the same snapshot; no XP attached
        let record = self.ledger.get_or_create(user_id).await?;
        for definition in newly_qualified_titles(&record, stats) {
            self.ledger.unlock_title(user_id, &definition.id).await?;
        }

        if !newly_unlocked.is_empty() {
            info!(%user_id, count = newly_unlocked.len(), "achievements unlocked");
        }

        Ok(newly_unlocked)
    }
}
