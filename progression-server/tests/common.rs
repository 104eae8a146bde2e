use migration::{Migrator, MigratorTrait};
use progression_server::config::Config;
use progression_server::engine::ProgressionEngine;

/// Creates a test config with the documented default rewards
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        task_xp_reward: 10,
        task_coin_reward: 2,
        goal_xp_reward: 25,
        goal_coin_reward: 5,
        event_xp_reward: 15,
        event_coin_reward: 3,
        leaderboard_max_limit: 100,
    }
}

/// Creates an engine wired to an in-memory database
pub async fn create_test_engine() -> ProgressionEngine {
    let db = progression_persistence::connection::connect_to_memory_database()
        .await
        .unwrap();
    Migrator::up(&db, None).await.unwrap();
    ProgressionEngine::new(create_test_config(), db)
}
