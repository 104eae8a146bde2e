use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ChallengeType {
    Tasks,
    Goals,
    Streak,
    Events,
    Login,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Tasks => "tasks",
            ChallengeType::Goals => "goals",
            ChallengeType::Streak => "streak",
            ChallengeType::Events => "events",
            ChallengeType::Login => "login",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tasks" => Some(ChallengeType::Tasks),
            "goals" => Some(ChallengeType::Goals),
            "streak" => Some(ChallengeType::Streak),
            "events" => Some(ChallengeType::Events),
            "login" => Some(ChallengeType::Login),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ChallengeDifficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChallengeReward {
    pub xp: i64,
    pub coins: i64,
    pub title: Option<String>,
}

/// A weekly challenge instance as served to the dashboard.
///
/// `completed` is derived (`current >= target`) and sticky; `claimed` flips
/// exactly once when the reward is paid out.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub challenge_type: ChallengeType,
    pub target: i32,
    pub current: i32,
    pub reward: ChallengeReward,
    pub difficulty: ChallengeDifficulty,
    pub start_date: String, // ISO 8601 string
    pub end_date: String,   // ISO 8601 string
    pub completed: bool,
    pub claimed: bool,
}

/// Aggregate of completed-but-unclaimed challenge rewards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingRewards {
    pub xp: i64,
    pub coins: i64,
}

/// Outcome of a successful challenge claim, including the ledger state the
/// payout produced.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClaimedReward {
    pub challenge_id: String,
    pub xp: i64,
    pub coins: i64,
    pub title: Option<String>,
    pub new_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
}
