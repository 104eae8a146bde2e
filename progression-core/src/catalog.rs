use progression_types::{
    AchievementCondition, AchievementDef, AchievementRarity, ProgressRecord, TitleDef,
    TitleRarity, TitleRequirement, UserStats, STARTER_TITLE,
};

// Achievement ids are stable across releases; the dashboard keys its badge
// art off them.
pub const FIRST_TASK: &str = "first_task";
pub const FIRST_GOAL: &str = "first_goal";
pub const TASK_MACHINE: &str = "task_machine";
pub const TASK_LEGEND: &str = "task_legend";
pub const GOAL_GETTER: &str = "goal_getter";
pub const GOAL_CRUSHER: &str = "goal_crusher";
pub const EVENT_PLANNER: &str = "event_planner";
pub const WEEK_WARRIOR: &str = "week_warrior";
pub const MONTH_OF_FIRE: &str = "month_of_fire";
pub const LEVEL_5: &str = "level_5";
pub const LEVEL_10: &str = "level_10";
pub const LEVEL_25: &str = "level_25";
pub const LEVEL_50: &str = "level_50";
pub const XP_HOARDER: &str = "xp_hoarder";
pub const DEDICATED: &str = "dedicated";
pub const COLLECTOR: &str = "collector";

fn achievement(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    rarity: AchievementRarity,
    xp_reward: i64,
    condition: AchievementCondition,
) -> AchievementDef {
    AchievementDef {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        rarity,
        xp_reward,
        condition,
    }
}

/// The full achievement catalog, in evaluation order.
///
/// This list is the canonical source of truth; the dashboard renders each
/// badge from it (earned = full color, unearned = grayscale).
pub fn achievement_catalog() -> Vec<AchievementDef> {
    use AchievementCondition as Cond;
    use AchievementRarity::*;

    vec![
        achievement(
            FIRST_TASK,
            "First Task",
            "Completed your first task. The grind begins.",
            "check",
            Bronze,
            25,
            Cond::TasksCompleted { count: 1 },
        ),
        achievement(
            FIRST_GOAL,
            "First Goal",
            "Completed your first goal.",
            "target",
            Bronze,
            50,
            Cond::GoalsCompleted { count: 1 },
        ),
        achievement(
            TASK_MACHINE,
            "Task Machine",
            "Completed 50 tasks.",
            "gears",
            Silver,
            150,
            Cond::TasksCompleted { count: 50 },
        ),
        achievement(
            TASK_LEGEND,
            "Task Legend",
            "Completed 250 tasks.",
            "crown",
            Gold,
            400,
            Cond::TasksCompleted { count: 250 },
        ),
        achievement(
            GOAL_GETTER,
            "Goal Getter",
            "Completed 10 goals.",
            "flag",
            Silver,
            150,
            Cond::GoalsCompleted { count: 10 },
        ),
        achievement(
            GOAL_CRUSHER,
            "Goal Crusher",
            "Completed 50 goals.",
            "hammer",
            Gold,
            400,
            Cond::GoalsCompleted { count: 50 },
        ),
        achievement(
            EVENT_PLANNER,
            "Event Planner",
            "Created 10 stream events.",
            "calendar",
            Silver,
            100,
            Cond::EventsCreated { count: 10 },
        ),
        achievement(
            WEEK_WARRIOR,
            "Week Warrior",
            "Kept a 7-day activity streak.",
            "flame",
            Silver,
            100,
            Cond::Streak { days: 7 },
        ),
        achievement(
            MONTH_OF_FIRE,
            "Month of Fire",
            "Kept a 30-day activity streak.",
            "inferno",
            Gold,
            300,
            Cond::Streak { days: 30 },
        ),
        achievement(
            LEVEL_5,
            "Level 5",
            "Reached level 5.",
            "star",
            Bronze,
            50,
            Cond::Level { threshold: 5 },
        ),
        achievement(
            LEVEL_10,
            "Level 10",
            "Reached level 10.",
            "star",
            Silver,
            150,
            Cond::Level { threshold: 10 },
        ),
        achievement(
            LEVEL_25,
            "Level 25",
            "Reached level 25.",
            "star",
            Gold,
            500,
            Cond::Level { threshold: 25 },
        ),
        achievement(
            LEVEL_50,
            "Level 50",
            "Reached level 50. Untouchable.",
            "diamond",
            Diamond,
            1000,
            Cond::Level { threshold: 50 },
        ),
        achievement(
            XP_HOARDER,
            "XP Hoarder",
            "Accumulated 10,000 lifetime XP.",
            "vault",
            Gold,
            250,
            Cond::TotalXp { threshold: 10_000 },
        ),
        achievement(
            DEDICATED,
            "Dedicated",
            "Active on 30 different days.",
            "medal",
            Silver,
            100,
            Cond::DaysActive { days: 30 },
        ),
        achievement(
            COLLECTOR,
            "Collector",
            "Unlocked 10 achievements.",
            "trophy",
            Diamond,
            500,
            Cond::AchievementCount { threshold: 10 },
        ),
    ]
}

pub fn find_achievement(achievement_id: &str) -> Option<AchievementDef> {
    achievement_catalog()
        .into_iter()
        .find(|def| def.id == achievement_id)
}

// Title ids; `weekly_champion` and `challenge_conqueror` are special and
// only granted through challenge rewards.
pub const TITLE_GRINDER: &str = "grinder";
pub const TITLE_ACHIEVER: &str = "achiever";
pub const TITLE_STREAK_KEEPER: &str = "streak_keeper";
pub const TITLE_GOAL_DIGGER: &str = "goal_digger";
pub const TITLE_VETERAN: &str = "veteran";
pub const TITLE_XP_BARON: &str = "xp_baron";
pub const TITLE_UNSTOPPABLE: &str = "unstoppable";
pub const TITLE_APEX: &str = "apex";
pub const TITLE_CHALLENGE_CONQUEROR: &str = "challenge_conqueror";
pub const TITLE_WEEKLY_CHAMPION: &str = "weekly_champion";

fn title(id: &str, name: &str, rarity: TitleRarity, requirement: TitleRequirement) -> TitleDef {
    TitleDef {
        id: id.to_string(),
        name: name.to_string(),
        rarity,
        requirement,
    }
}

/// The full title catalog.
pub fn title_catalog() -> Vec<TitleDef> {
    use TitleRarity::*;
    use TitleRequirement as Req;

    vec![
        title(STARTER_TITLE, "Newcomer", Common, Req::Level { threshold: 1 }),
        title(TITLE_GRINDER, "Grinder", Common, Req::Tasks { count: 25 }),
        title(TITLE_ACHIEVER, "Achiever", Rare, Req::Achievements { count: 5 }),
        title(
            TITLE_STREAK_KEEPER,
            "Streak Keeper",
            Rare,
            Req::Streak { days: 7 },
        ),
        title(TITLE_GOAL_DIGGER, "Goal Digger", Rare, Req::Goals { count: 25 }),
        title(TITLE_VETERAN, "Veteran", Epic, Req::Level { threshold: 20 }),
        title(
            TITLE_XP_BARON,
            "XP Baron",
            Epic,
            Req::Xp { threshold: 25_000 },
        ),
        title(
            TITLE_UNSTOPPABLE,
            "Unstoppable",
            Legendary,
            Req::Streak { days: 60 },
        ),
        title(TITLE_APEX, "Apex", Legendary, Req::Level { threshold: 40 }),
        title(
            TITLE_CHALLENGE_CONQUEROR,
            "Challenge Conqueror",
            Epic,
            Req::Special,
        ),
        title(
            TITLE_WEEKLY_CHAMPION,
            "Weekly Champion",
            Mythic,
            Req::Special,
        ),
    ]
}

pub fn find_title(title_id: &str) -> Option<TitleDef> {
    title_catalog().into_iter().find(|def| def.id == title_id)
}

fn title_requirement_met(requirement: &TitleRequirement, record: &ProgressRecord, stats: &UserStats) -> bool {
    match requirement {
        TitleRequirement::Level { threshold } => record.level >= *threshold,
        TitleRequirement::Xp { threshold } => record.xp >= *threshold,
        TitleRequirement::Achievements { count } => record.achievements.len() as u32 >= *count,
        TitleRequirement::Streak { days } => stats.current_streak >= *days,
        TitleRequirement::Tasks { count } => stats.total_tasks_completed >= *count,
        TitleRequirement::Goals { count } => stats.total_goals_completed >= *count,
        // Special titles are only ever granted explicitly
        TitleRequirement::Special => false,
    }
}

/// Achievements not yet on the record whose condition the stats snapshot now
/// satisfies, in catalog order.
pub fn newly_qualified_achievements(
    record: &ProgressRecord,
    stats: &UserStats,
) -> Vec<AchievementDef> {
    let unlocked_count = record.achievements.len() as u32;
    achievement_catalog()
        .into_iter()
        .filter(|def| !record.has_achievement(&def.id))
        .filter(|def| {
            def.condition
                .is_met(stats, record.level, record.xp, unlocked_count)
        })
        .collect()
}

/// Titles not yet unlocked whose requirement the record/stats now satisfy.
/// Special titles never appear here.
pub fn newly_qualified_titles(record: &ProgressRecord, stats: &UserStats) -> Vec<TitleDef> {
    title_catalog()
        .into_iter()
        .filter(|def| !record.has_title(&def.id))
        .filter(|def| title_requirement_met(&def.requirement, record, stats))
        .collect()
}
