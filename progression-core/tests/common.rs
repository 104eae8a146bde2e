use progression_types::{ProgressRecord, UserStats, STARTER_TITLE};
use uuid::Uuid;

/// Creates a fresh progress record at the given level/xp
pub fn create_test_record(level: i32, xp: i64) -> ProgressRecord {
    ProgressRecord {
        user_id: Uuid::new_v4(),
        xp,
        level,
        coins: 0,
        achievements: Vec::new(),
        unlocked_titles: vec![STARTER_TITLE.to_string()],
        active_title: Some(STARTER_TITLE.to_string()),
        weekly_xp: 0,
        monthly_xp: 0,
        is_premium: false,
        premium_since: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

/// Creates a stats snapshot with the given task/goal counts
pub fn create_test_stats(tasks: u32, goals: u32) -> UserStats {
    UserStats {
        total_tasks_completed: tasks,
        total_goals_completed: goals,
        total_events_created: 0,
        current_streak: 0,
        longest_streak: 0,
        days_active: 0,
    }
}
