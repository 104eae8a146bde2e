use progression_types::ActivityKind;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub task_xp_reward: i64,
    pub task_coin_reward: i64,
    pub goal_xp_reward: i64,
    pub goal_coin_reward: i64,
    pub event_xp_reward: i64,
    pub event_coin_reward: i64,
    pub leaderboard_max_limit: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            task_xp_reward: env::var("TASK_XP_REWARD")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid TASK_XP_REWARD"),
            task_coin_reward: env::var("TASK_COIN_REWARD")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid TASK_COIN_REWARD"),
            goal_xp_reward: env::var("GOAL_XP_REWARD")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .expect("Invalid GOAL_XP_REWARD"),
            goal_coin_reward: env::var("GOAL_COIN_REWARD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid GOAL_COIN_REWARD"),
            event_xp_reward: env::var("EVENT_XP_REWARD")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("Invalid EVENT_XP_REWARD"),
            event_coin_reward: env::var("EVENT_COIN_REWARD")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("Invalid EVENT_COIN_REWARD"),
            leaderboard_max_limit: env::var("LEADERBOARD_MAX_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("Invalid LEADERBOARD_MAX_LIMIT"),
        }
    }

    /// `(xp, coins)` reward for one action of `kind`.
    pub fn rewards_for(&self, kind: ActivityKind) -> (i64, i64) {
        match kind {
            ActivityKind::Task => (self.task_xp_reward, self.task_coin_reward),
            ActivityKind::Goal => (self.goal_xp_reward, self.goal_coin_reward),
            ActivityKind::Event => (self.event_xp_reward, self.event_coin_reward),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
