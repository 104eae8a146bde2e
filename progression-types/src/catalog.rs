use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::progress::UserStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AchievementRarity {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

/// Unlock condition over a `UserStats` snapshot. Tagged variants instead of
/// embedded predicates so the catalog stays plain data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AchievementCondition {
    Level { threshold: i32 },
    TotalXp { threshold: i64 },
    AchievementCount { threshold: u32 },
    Streak { days: u32 },
    TasksCompleted { count: u32 },
    GoalsCompleted { count: u32 },
    EventsCreated { count: u32 },
    DaysActive { days: u32 },
}

impl AchievementCondition {
    /// Evaluate the condition against a stats snapshot.
    ///
    /// `Level`, `TotalXp` and `AchievementCount` are conditions on the
    /// progress record itself, passed alongside the stats.
    pub fn is_met(&self, stats: &UserStats, level: i32, xp: i64, unlocked_count: u32) -> bool {
        match self {
            AchievementCondition::Level { threshold } => level >= *threshold,
            AchievementCondition::TotalXp { threshold } => xp >= *threshold,
            AchievementCondition::AchievementCount { threshold } => unlocked_count >= *threshold,
            AchievementCondition::Streak { days } => stats.current_streak >= *days,
            AchievementCondition::TasksCompleted { count } => {
                stats.total_tasks_completed >= *count
            }
            AchievementCondition::GoalsCompleted { count } => {
                stats.total_goals_completed >= *count
            }
            AchievementCondition::EventsCreated { count } => {
                stats.total_events_created >= *count
            }
            AchievementCondition::DaysActive { days } => stats.days_active >= *days,
        }
    }
}

/// Static catalog entry. Immutable at runtime; catalog order is the
/// evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: AchievementRarity,
    pub xp_reward: i64,
    pub condition: AchievementCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TitleRarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

/// Requirement for auto-unlocking a title. `Special` titles are never
/// auto-unlocked; they require an explicit grant (e.g. a challenge reward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TitleRequirement {
    Level { threshold: i32 },
    Xp { threshold: i64 },
    Achievements { count: u32 },
    Streak { days: u32 },
    Tasks { count: u32 },
    Goals { count: u32 },
    Special,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TitleDef {
    pub id: String,
    pub name: String,
    pub rarity: TitleRarity,
    pub requirement: TitleRequirement,
}
