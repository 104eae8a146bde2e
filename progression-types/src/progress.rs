use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Title every new record starts with, unlocked and active.
pub const STARTER_TITLE: &str = "newcomer";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProgressRecord {
    pub user_id: Uuid,
    pub xp: i64,
    pub level: i32,
    pub coins: i64,
    pub achievements: Vec<String>,
    pub unlocked_titles: Vec<String>,
    pub active_title: Option<String>,
    pub weekly_xp: i64,
    pub monthly_xp: i64,
    pub is_premium: bool,
    pub premium_since: Option<String>, // ISO 8601 string
    pub created_at: String,            // ISO 8601 string for simplicity
    pub updated_at: String,
}

impl ProgressRecord {
    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.achievements.iter().any(|id| id == achievement_id)
    }

    pub fn has_title(&self, title_id: &str) -> bool {
        self.unlocked_titles.iter().any(|id| id == title_id)
    }
}

/// Result of a single XP grant against the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct XpGrant {
    pub new_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
}

/// Progress through the current level, for the dashboard progress bar.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LevelProgress {
    pub current_level_xp: i64,
    pub needed_for_next: i64,
    pub percentage: f64,
}

/// Snapshot of user statistics, recomputed from activity records each time
/// achievements are checked. Never persisted as its own entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub total_tasks_completed: u32,
    pub total_goals_completed: u32,
    pub total_events_created: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub days_active: u32,
}
