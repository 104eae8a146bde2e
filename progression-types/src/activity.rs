use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// User action kinds the recorder aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ActivityKind {
    Task,
    Goal,
    Event,
}

/// One record per `(user, calendar day)`, feeding the calendar heatmap.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyActivity {
    pub user_id: Uuid,
    pub date: String, // YYYY-MM-DD
    pub tasks_completed: i32,
    pub goals_completed: i32,
    pub events_created: i32,
    pub xp_earned: i64,
    pub coins_earned: i64,
}

impl DailyActivity {
    pub fn total_count(&self) -> i32 {
        self.tasks_completed + self.goals_completed + self.events_created
    }
}

/// Dense calendar series entry; `count` is zero for days with no activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarDay {
    pub date: String, // YYYY-MM-DD
    pub count: i32,
}
