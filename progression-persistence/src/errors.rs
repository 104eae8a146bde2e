use sea_orm::DbErr;
use thiserror::Error;

/// Expected-failure paths of ledger mutations. Validation variants reject
/// synchronously with no mutation performed.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient coins: need {required}, have {balance}")]
    InsufficientCoins { required: i64, balance: i64 },
    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: i64 },
    #[error("unknown achievement: {achievement_id}")]
    UnknownAchievement { achievement_id: String },
    #[error("unknown title: {title_id}")]
    UnknownTitle { title_id: String },
    #[error(transparent)]
    Storage(#[from] DbErr),
}

/// Claim failures are signalled distinctly so the dashboard can message
/// each case.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("challenge not found: {challenge_id}")]
    NotFound { challenge_id: String },
    #[error("challenge not completed: {challenge_id}")]
    NotCompleted { challenge_id: String },
    #[error("challenge already claimed: {challenge_id}")]
    AlreadyClaimed { challenge_id: String },
    #[error(transparent)]
    Storage(#[from] DbErr),
}
