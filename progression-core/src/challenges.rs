use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, Local};
use progression_types::{
    Challenge, ChallengeDifficulty, ChallengeReward, ChallengeType, PendingRewards,
};
use rand::Rng;

use crate::catalog::{TITLE_CHALLENGE_CONQUEROR, TITLE_WEEKLY_CHAMPION};

/// A pool entry. Instances reference their template by pool index, so the
/// order of this array is part of the persisted challenge id.
pub struct ChallengeTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub challenge_type: ChallengeType,
    pub target: i32,
    pub reward_xp: i64,
    pub reward_coins: i64,
    pub reward_title: Option<&'static str>,
    pub difficulty: ChallengeDifficulty,
}

pub const CHALLENGE_POOL: &[ChallengeTemplate] = &[
    // easy
    ChallengeTemplate {
        title: "Warm-Up",
        description: "Complete 5 tasks this week.",
        icon: "check",
        challenge_type: ChallengeType::Tasks,
        target: 5,
        reward_xp: 50,
        reward_coins: 10,
        reward_title: None,
        difficulty: ChallengeDifficulty::Easy,
    },
    ChallengeTemplate {
        title: "Show Up",
        description: "Log in on 3 different days.",
        icon: "door",
        challenge_type: ChallengeType::Login,
        target: 3,
        reward_xp: 40,
        reward_coins: 10,
        reward_title: None,
        difficulty: ChallengeDifficulty::Easy,
    },
    ChallengeTemplate {
        title: "Little Wins",
        description: "Complete a goal this week.",
        icon: "target",
        challenge_type: ChallengeType::Goals,
        target: 1,
        reward_xp: 60,
        reward_coins: 15,
        reward_title: None,
        difficulty: ChallengeDifficulty::Easy,
    },
    ChallengeTemplate {
        title: "On the Board",
        description: "Create a stream event.",
        icon: "calendar",
        challenge_type: ChallengeType::Events,
        target: 1,
        reward_xp: 40,
        reward_coins: 10,
        reward_title: None,
        difficulty: ChallengeDifficulty::Easy,
    },
    // medium
    ChallengeTemplate {
        title: "Task Marathon",
        description: "Complete 15 tasks this week.",
        icon: "running",
        challenge_type: ChallengeType::Tasks,
        target: 15,
        reward_xp: 150,
        reward_coins: 30,
        reward_title: None,
        difficulty: ChallengeDifficulty::Medium,
    },
    ChallengeTemplate {
        title: "Triple Threat",
        description: "Complete 3 goals this week.",
        icon: "flag",
        challenge_type: ChallengeType::Goals,
        target: 3,
        reward_xp: 180,
        reward_coins: 40,
        reward_title: None,
        difficulty: ChallengeDifficulty::Medium,
    },
    ChallengeTemplate {
        title: "Keep the Flame",
        description: "Hold a 3-day activity streak.",
        icon: "flame",
        challenge_type: ChallengeType::Streak,
        target: 3,
        reward_xp: 150,
        reward_coins: 35,
        reward_title: None,
        difficulty: ChallengeDifficulty::Medium,
    },
    ChallengeTemplate {
        title: "Crowd Builder",
        description: "Create 3 stream events.",
        icon: "megaphone",
        challenge_type: ChallengeType::Events,
        target: 3,
        reward_xp: 160,
        reward_coins: 35,
        reward_title: None,
        difficulty: ChallengeDifficulty::Medium,
    },
    ChallengeTemplate {
        title: "Regular",
        description: "Log in on 5 different days.",
        icon: "repeat",
        challenge_type: ChallengeType::Login,
        target: 5,
        reward_xp: 140,
        reward_coins: 30,
        reward_title: None,
        difficulty: ChallengeDifficulty::Medium,
    },
    // hard
    ChallengeTemplate {
        title: "Task Overlord",
        description: "Complete 40 tasks this week.",
        icon: "crown",
        challenge_type: ChallengeType::Tasks,
        target: 40,
        reward_xp: 400,
        reward_coins: 100,
        reward_title: Some(TITLE_CHALLENGE_CONQUEROR),
        difficulty: ChallengeDifficulty::Hard,
    },
    ChallengeTemplate {
        title: "Goal Rush",
        description: "Complete 7 goals this week.",
        icon: "bolt",
        challenge_type: ChallengeType::Goals,
        target: 7,
        reward_xp: 450,
        reward_coins: 110,
        reward_title: None,
        difficulty: ChallengeDifficulty::Hard,
    },
    ChallengeTemplate {
        title: "Iron Week",
        description: "Hold a 7-day activity streak.",
        icon: "shield",
        challenge_type: ChallengeType::Streak,
        target: 7,
        reward_xp: 500,
        reward_coins: 120,
        reward_title: Some(TITLE_WEEKLY_CHAMPION),
        difficulty: ChallengeDifficulty::Hard,
    },
    ChallengeTemplate {
        title: "Full House",
        description: "Log in every day of the week.",
        icon: "house",
        challenge_type: ChallengeType::Login,
        target: 7,
        reward_xp: 420,
        reward_coins: 100,
        reward_title: None,
        difficulty: ChallengeDifficulty::Hard,
    },
    // extreme entries stay in the pool for seasonal events; weekly
    // generation never selects them
    ChallengeTemplate {
        title: "Century",
        description: "Complete 100 tasks this week.",
        icon: "hundred",
        challenge_type: ChallengeType::Tasks,
        target: 100,
        reward_xp: 1200,
        reward_coins: 300,
        reward_title: None,
        difficulty: ChallengeDifficulty::Extreme,
    },
];

/// Bounds of the week containing `now`: Sunday 00:00:00 through Saturday
/// 23:59:59.999, local time.
pub fn week_bounds(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
    let start_date = now.date_naive() - Duration::days(days_from_sunday);
    let start = start_date
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .earliest()
        .unwrap();
    let end = start + Duration::days(7) - Duration::milliseconds(1);
    (start, end)
}

fn pick_index<R: Rng>(rng: &mut R, difficulty: ChallengeDifficulty) -> Result<usize> {
    let candidates: Vec<usize> = CHALLENGE_POOL
        .iter()
        .enumerate()
        .filter(|(_, template)| template.difficulty == difficulty)
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        return Err(anyhow!("no {:?} challenges in pool", difficulty));
    }

    Ok(candidates[rng.gen_range(0..candidates.len())])
}

fn instantiate(
    pool_index: usize,
    week_start: DateTime<Local>,
    week_end: DateTime<Local>,
) -> Challenge {
    let template = &CHALLENGE_POOL[pool_index];
    Challenge {
        id: format!(
            "challenge_{}_{}",
            week_start.timestamp_millis(),
            pool_index
        ),
        title: template.title.to_string(),
        description: template.description.to_string(),
        icon: template.icon.to_string(),
        challenge_type: template.challenge_type,
        target: template.target,
        current: 0,
        reward: ChallengeReward {
            xp: template.reward_xp,
            coins: template.reward_coins,
            title: template.reward_title.map(str::to_string),
        },
        difficulty: template.difficulty,
        start_date: week_start.to_rfc3339(),
        end_date: week_end.to_rfc3339(),
        completed: false,
        claimed: false,
    }
}

/// Rebuild a challenge instance from its persisted state and pool template.
/// Returns `None` for a pool index that no longer exists.
pub fn challenge_from_pool(
    pool_index: usize,
    week_start: DateTime<Local>,
    current: i32,
    completed: bool,
    claimed: bool,
) -> Option<Challenge> {
    if pool_index >= CHALLENGE_POOL.len() {
        return None;
    }
    let week_end = week_start + Duration::days(7) - Duration::milliseconds(1);
    let mut challenge = instantiate(pool_index, week_start, week_end);
    challenge.current = current;
    challenge.completed = completed;
    challenge.claimed = claimed;
    Some(challenge)
}

/// Select this week's set: 1 easy, 2 medium with distinct titles, 1 hard.
pub fn generate_weekly_challenges<R: Rng>(
    now: DateTime<Local>,
    rng: &mut R,
) -> Result<Vec<Challenge>> {
    let (week_start, week_end) = week_bounds(now);

    let easy = pick_index(rng, ChallengeDifficulty::Easy)?;
    let medium_first = pick_index(rng, ChallengeDifficulty::Medium)?;
    let mut medium_second = pick_index(rng, ChallengeDifficulty::Medium)?;
    while CHALLENGE_POOL[medium_second].title == CHALLENGE_POOL[medium_first].title {
        medium_second = pick_index(rng, ChallengeDifficulty::Medium)?;
    }
    let hard = pick_index(rng, ChallengeDifficulty::Hard)?;

    let selected = [easy, medium_first, medium_second, hard];
    tracing::debug!(?selected, week_start = %week_start, "generated weekly challenge set");

    Ok(selected
        .iter()
        .map(|&index| instantiate(index, week_start, week_end))
        .collect())
}

/// Apply `increment` progress of `challenge_type` to every non-completed
/// matching challenge. `current` clamps at `target`; completed instances
/// are frozen.
pub fn update_challenge_progress(
    challenges: &mut [Challenge],
    challenge_type: ChallengeType,
    increment: i32,
) {
    for challenge in challenges
        .iter_mut()
        .filter(|c| !c.completed && c.challenge_type == challenge_type)
    {
        challenge.current = (challenge.current + increment).min(challenge.target);
        challenge.completed = challenge.current >= challenge.target;
    }
}

/// Sum of rewards on completed, unclaimed challenges.
pub fn total_pending_rewards(challenges: &[Challenge]) -> PendingRewards {
    challenges
        .iter()
        .filter(|c| c.completed && !c.claimed)
        .fold(PendingRewards::default(), |mut totals, c| {
            totals.xp += c.reward.xp;
            totals.coins += c.reward.coins;
            totals
        })
}

/// Time left in the current week as `"{days}d {hours}h"`, or `"{hours}h"`
/// once under a day remains.
pub fn time_until_week_end(now: DateTime<Local>) -> String {
    let (_, week_end) = week_bounds(now);
    let remaining = week_end - now;
    let days = remaining.num_days();
    let hours = remaining.num_hours() - days * 24;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else {
        format!("{}h", hours)
    }
}
