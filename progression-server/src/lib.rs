use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

use crate::engine::ProgressionEngine;
use progression_core::{time_until_week_end, total_pending_rewards, LevelingCurve};
use progression_persistence::errors::{ClaimError, LedgerError};
use progression_types::{LevelProgress, PendingRewards, ProgressRecord, ProgressionError};

pub mod config;
pub mod engine;
pub mod evaluator;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<u64>,
}

#[derive(Deserialize)]
struct CalendarQuery {
    days: Option<u32>,
}

#[derive(Deserialize)]
struct ActionRequest {
    kind: progression_types::ActivityKind,
}

#[derive(Deserialize)]
struct TitleRequest {
    title_id: Option<String>,
}

#[derive(Deserialize)]
struct SpendRequest {
    amount: i64,
}

#[derive(serde::Serialize)]
struct ProgressResponse {
    record: ProgressRecord,
    level_progress: LevelProgress,
    rank: Option<u32>,
}

#[derive(serde::Serialize)]
struct ChallengesResponse {
    challenges: Vec<progression_types::Challenge>,
    pending: PendingRewards,
    time_remaining: String,
}

#[derive(serde::Serialize)]
struct BalanceResponse {
    coins: i64,
}

#[derive(serde::Serialize)]
struct ResetResponse {
    rows_affected: u64,
}

#[derive(serde::Serialize)]
struct ActiveTitleResponse {
    active_title: Option<String>,
}

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

fn error_reply(status: StatusCode, message: &str) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
}

fn typed_error_reply(status: StatusCode, error: &ProgressionError) -> JsonReply {
    warp::reply::with_status(warp::reply::json(error), status)
}

fn parse_user_id(user_id: &str) -> Result<Uuid, JsonReply> {
    Uuid::parse_str(user_id)
        .map_err(|_| error_reply(StatusCode::BAD_REQUEST, "Invalid user ID format"))
}

pub fn create_routes(
    engine: Arc<ProgressionEngine>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let engine_filter = warp::any().map({
        let engine = engine.clone();
        move || engine.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let progress = warp::path!("user" / String / "progress")
        .and(warp::get())
        .and(engine_filter.clone())
        .and_then(handle_get_progress);

    let action = warp::path!("user" / String / "action")
        .and(warp::post())
        .and(warp::body::json())
        .and(engine_filter.clone())
        .and_then(handle_action);

    let login = warp::path!("user" / String / "login")
        .and(warp::post())
        .and(engine_filter.clone())
        .and_then(handle_login);

    let stats = warp::path!("user" / String / "stats")
        .and(warp::get())
        .and(engine_filter.clone())
        .and_then(handle_stats);

    let challenges = warp::path!("user" / String / "challenges")
        .and(warp::get())
        .and(engine_filter.clone())
        .and_then(handle_challenges);

    let claim = warp::path!("user" / String / "challenges" / String / "claim")
        .and(warp::post())
        .and(engine_filter.clone())
        .and_then(handle_claim);

    let calendar = warp::path!("user" / String / "calendar")
        .and(warp::get())
        .and(warp::query::<CalendarQuery>())
        .and(engine_filter.clone())
        .and_then(handle_calendar);

    let set_title = warp::path!("user" / String / "title")
        .and(warp::post())
        .and(warp::body::json())
        .and(engine_filter.clone())
        .and_then(handle_set_title);

    let spend = warp::path!("user" / String / "coins" / "spend")
        .and(warp::post())
        .and(warp::body::json())
        .and(engine_filter.clone())
        .and_then(handle_spend);

    let leaderboard = warp::path!("leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(engine_filter.clone())
        .and_then(handle_leaderboard);

    let reset_weekly = warp::path!("admin" / "reset" / "weekly")
        .and(warp::post())
        .and(engine_filter.clone())
        .and_then(handle_reset_weekly);

    let reset_monthly = warp::path!("admin" / "reset" / "monthly")
        .and(warp::post())
        .and(engine_filter.clone())
        .and_then(handle_reset_monthly);

    let reset_user = warp::path!("admin" / "user" / String / "reset")
        .and(warp::post())
        .and(engine_filter.clone())
        .and_then(handle_reset_user);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    health
        .or(progress)
        .or(action)
        .or(login)
        .or(stats)
        .or(challenges)
        .or(claim)
        .or(calendar)
        .or(set_title)
        .or(spend)
        .or(leaderboard)
        .or(reset_weekly)
        .or(reset_monthly)
        .or(reset_user)
        .with(cors)
        .with(warp::log("progression"))
}

async fn handle_get_progress(
    user_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    let record = match engine.ledger().get_or_create(user_id).await {
        Ok(record) => record,
        Err(err) => {
            tracing::error!("Failed to load progress: {}", err);
            return Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load progress",
            ));
        }
    };

    let rank = match engine.ledger().get_user_rank(user_id).await {
        Ok(rank) => rank,
        Err(err) => {
            tracing::error!("Failed to get user rank: {}", err);
            None
        }
    };

    let level_progress = LevelingCurve::progress_within_level(record.xp, record.level);
    let response = ProgressResponse {
        record,
        level_progress,
        rank,
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}

async fn handle_action(
    user_id: String,
    request: ActionRequest,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.record_action(user_id, request.kind).await {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&outcome),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to record action: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record action",
            ))
        }
    }
}

async fn handle_login(
    user_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.record_login(user_id).await {
        Ok(challenges) => Ok(warp::reply::with_status(
            warp::reply::json(&challenges),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to record login: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record login",
            ))
        }
    }
}

async fn handle_stats(
    user_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.user_stats(user_id).await {
        Ok(stats) => Ok(warp::reply::with_status(
            warp::reply::json(&stats),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to compute stats: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to compute stats",
            ))
        }
    }
}

async fn handle_challenges(
    user_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.weekly_challenges(user_id).await {
        Ok(challenges) => {
            let response = ChallengesResponse {
                pending: total_pending_rewards(&challenges),
                time_remaining: time_until_week_end(chrono::Local::now()),
                challenges,
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            tracing::error!("Failed to load challenges: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load challenges",
            ))
        }
    }
}

async fn handle_claim(
    user_id: String,
    challenge_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.claim_challenge(user_id, &challenge_id).await {
        Ok(reward) => Ok(warp::reply::with_status(
            warp::reply::json(&reward),
            StatusCode::OK,
        )),
        Err(ClaimError::NotFound { challenge_id }) => Ok(typed_error_reply(
            StatusCode::NOT_FOUND,
            &ProgressionError::ChallengeNotFound { challenge_id },
        )),
        Err(ClaimError::NotCompleted { challenge_id }) => Ok(typed_error_reply(
            StatusCode::BAD_REQUEST,
            &ProgressionError::ChallengeNotCompleted { challenge_id },
        )),
        Err(ClaimError::AlreadyClaimed { challenge_id }) => Ok(typed_error_reply(
            StatusCode::CONFLICT,
            &ProgressionError::ChallengeAlreadyClaimed { challenge_id },
        )),
        Err(ClaimError::Storage(err)) => {
            tracing::error!("Failed to claim challenge: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to claim challenge",
            ))
        }
    }
}

async fn handle_calendar(
    user_id: String,
    query: CalendarQuery,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    let days = query.days.unwrap_or(30).clamp(1, 365);
    let today = chrono::Local::now().date_naive();
    match engine.activity().get_calendar(user_id, days, today).await {
        Ok(series) => Ok(warp::reply::with_status(
            warp::reply::json(&series),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to build calendar: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build calendar",
            ))
        }
    }
}

async fn handle_set_title(
    user_id: String,
    request: TitleRequest,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine
        .ledger()
        .set_active_title(user_id, request.title_id.as_deref())
        .await
    {
        Ok(true) => Ok(warp::reply::with_status(
            warp::reply::json(&ActiveTitleResponse {
                active_title: request.title_id,
            }),
            StatusCode::OK,
        )),
        Ok(false) => Ok(typed_error_reply(
            StatusCode::BAD_REQUEST,
            &ProgressionError::TitleNotUnlocked {
                title_id: request.title_id.unwrap_or_default(),
            },
        )),
        Err(err) => {
            tracing::error!("Failed to set active title: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to set active title",
            ))
        }
    }
}

async fn handle_spend(
    user_id: String,
    request: SpendRequest,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.ledger().spend_coins(user_id, request.amount).await {
        Ok(coins) => Ok(warp::reply::with_status(
            warp::reply::json(&BalanceResponse { coins }),
            StatusCode::OK,
        )),
        Err(LedgerError::InsufficientCoins { required, balance }) => Ok(typed_error_reply(
            StatusCode::BAD_REQUEST,
            &ProgressionError::InsufficientCoins { required, balance },
        )),
        Err(LedgerError::InvalidAmount { amount }) => Ok(typed_error_reply(
            StatusCode::BAD_REQUEST,
            &ProgressionError::InvalidRequest {
                message: format!("invalid amount: {}", amount),
            },
        )),
        Err(err) => {
            tracing::error!("Failed to spend coins: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to spend coins",
            ))
        }
    }
}

async fn handle_leaderboard(
    query: LeaderboardQuery,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let limit = query
        .limit
        .unwrap_or(10)
        .min(engine.config().leaderboard_max_limit);

    match engine.ledger().get_leaderboard(limit).await {
        Ok(leaderboard) => Ok(warp::reply::with_status(
            warp::reply::json(&leaderboard),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch leaderboard: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch leaderboard",
            ))
        }
    }
}

async fn handle_reset_weekly(
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    match engine.ledger().reset_weekly_xp().await {
        Ok(rows_affected) => Ok(warp::reply::with_status(
            warp::reply::json(&ResetResponse { rows_affected }),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to reset weekly XP: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reset weekly XP",
            ))
        }
    }
}

async fn handle_reset_monthly(
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    match engine.ledger().reset_monthly_xp().await {
        Ok(rows_affected) => Ok(warp::reply::with_status(
            warp::reply::json(&ResetResponse { rows_affected }),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to reset monthly XP: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reset monthly XP",
            ))
        }
    }
}

async fn handle_reset_user(
    user_id: String,
    engine: Arc<ProgressionEngine>,
) -> Result<JsonReply, warp::Rejection> {
    let user_id = match parse_user_id(&user_id) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };

    match engine.ledger().reset_progress(user_id).await {
        Ok(record) => Ok(warp::reply::with_status(
            warp::reply::json(&record),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to reset user progress: {}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reset user progress",
            ))
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::config::Config;
    use migration::{Migrator, MigratorTrait};
    use progression_types::STARTER_TITLE;

    fn test_config() -> Config {
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

    async fn create_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let db = progression_persistence::connection::connect_to_memory_database()
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = Arc::new(ProgressionEngine::new(test_config(), db));
        create_routes(engine)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_progress_created_lazily_on_first_read() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/progress", user_id))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["record"]["xp"], 0);
        assert_eq!(body["record"]["level"], 1);
        assert_eq!(body["record"]["coins"], 0);
        assert_eq!(body["record"]["active_title"], STARTER_TITLE);
        assert_eq!(body["level_progress"]["needed_for_next"], 100);
    }

    #[tokio::test]
    async fn test_invalid_user_id_format() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/user/not-a-uuid/progress")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
        let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(error["error"], "Invalid user ID format");
    }

    #[tokio::test]
    async fn test_task_action_grants_rewards() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", user_id))
            .json(&serde_json::json!({ "kind": "Task" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let outcome: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        // The task itself pays 10 XP / 2 coins at level 1
        assert_eq!(outcome["grant"]["new_xp"], 10);
        assert_eq!(outcome["grant"]["new_level"], 1);
        assert_eq!(outcome["grant"]["leveled_up"], false);
        assert_eq!(outcome["stats"]["total_tasks_completed"], 1);
        // The first task also unlocks its badge
        assert!(outcome["unlocked_achievements"]
            .as_array()
            .unwrap()
            .iter()
            .any(|id| id == "first_task"));

        // Ledger state reflects the grant plus the badge reward
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/progress", user_id))
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["record"]["coins"], 2);
        assert_eq!(body["record"]["xp"], 35); // 10 task + 25 first_task badge
    }

    #[tokio::test]
    async fn test_challenges_endpoint_serves_weekly_set() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/challenges", user_id))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let challenges = body["challenges"].as_array().unwrap();
        assert_eq!(challenges.len(), 4);
        assert!(!body["time_remaining"].as_str().unwrap().is_empty());
        assert_eq!(body["pending"]["xp"], 0);

        // The same set comes back on a second read
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/challenges", user_id))
            .reply(&app)
            .await;
        let second: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["challenges"], second["challenges"]);
    }

    #[tokio::test]
    async fn test_claim_failure_modes() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/challenges", user_id))
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let challenge_id = body["challenges"][0]["id"].as_str().unwrap();

        // Not completed yet
        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/user/{}/challenges/{}/claim",
                user_id, challenge_id
            ))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 400);

        // Unknown instance
        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/challenges/challenge_0_99/claim", user_id))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_spend_rejects_insufficient_coins() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/coins/spend", user_id))
            .json(&serde_json::json!({ "amount": 50 }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
        let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(error["InsufficientCoins"]["required"], 50);
        assert_eq!(error["InsufficientCoins"]["balance"], 0);

        // Earn some coins, then spend within balance
        warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", user_id))
            .json(&serde_json::json!({ "kind": "Goal" }))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/coins/spend", user_id))
            .json(&serde_json::json!({ "amount": 5 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["coins"], 0);
    }

    #[tokio::test]
    async fn test_set_title_rejects_locked_title() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/title", user_id))
            .json(&serde_json::json!({ "title_id": "apex" }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 400);

        // Active title unchanged
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/progress", user_id))
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["record"]["active_title"], STARTER_TITLE);

        // Clearing the active title is always allowed
        let response = warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/title", user_id))
            .json(&serde_json::json!({ "title_id": null }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_calendar_is_dense() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", user_id))
            .json(&serde_json::json!({ "kind": "Task" }))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/calendar?days=7", user_id))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let series: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let series = series.as_array().unwrap();
        assert_eq!(series.len(), 7);
        // Today is the last entry and holds the recorded task
        assert_eq!(series[6]["count"], 1);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_xp() {
        let app = create_test_app().await;
        let casual = Uuid::new_v4();
        let dedicated = Uuid::new_v4();

        warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", casual))
            .json(&serde_json::json!({ "kind": "Task" }))
            .reply(&app)
            .await;
        for _ in 0..3 {
            warp::test::request()
                .method("POST")
                .path(&format!("/user/{}/action", dedicated))
                .json(&serde_json::json!({ "kind": "Goal" }))
                .reply(&app)
                .await;
        }

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?limit=10")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let leaderboard: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let entries = leaderboard.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["record"]["user_id"], dedicated.to_string());
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[1]["record"]["user_id"], casual.to_string());
    }

    #[tokio::test]
    async fn test_admin_weekly_reset() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", user_id))
            .json(&serde_json::json!({ "kind": "Task" }))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("POST")
            .path("/admin/reset/weekly")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["rows_affected"], 1);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/user/{}/progress", user_id))
            .reply(&app)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["record"]["weekly_xp"], 0);
        assert!(body["record"]["xp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_admin_user_reset_returns_defaults() {
        let app = create_test_app().await;
        let user_id = Uuid::new_v4();

        warp::test::request()
            .method("POST")
            .path(&format!("/user/{}/action", user_id))
            .json(&serde_json::json!({ "kind": "Goal" }))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("POST")
            .path(&format!("/admin/user/{}/reset", user_id))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let record: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record["xp"], 0);
        assert_eq!(record["level"], 1);
        assert_eq!(record["coins"], 0);
        assert_eq!(record["achievements"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_routes() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/invalid")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_http_endpoints_cors() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("OPTIONS")
            .path("/health")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "GET")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
