use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Wire-facing failure reasons, serialized to the dashboard. Internal
/// storage errors map to `StorageUnavailable` without detail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProgressionError {
    InsufficientCoins { required: i64, balance: i64 },
    TitleNotUnlocked { title_id: String },
    UnknownTitle { title_id: String },
    UnknownAchievement { achievement_id: String },
    ChallengeNotFound { challenge_id: String },
    ChallengeNotCompleted { challenge_id: String },
    ChallengeAlreadyClaimed { challenge_id: String },
    InvalidRequest { message: String },
    StorageUnavailable,
}
