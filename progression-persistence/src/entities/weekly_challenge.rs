//! WeeklyChallenge entity - a persisted challenge instance
//!
//! Only mutable state lives here; display fields rehydrate from the
//! challenge pool by `pool_index`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // challenge_{weekStartMillis}_{poolIndex}
    pub week_start: i64, // epoch millis of Sunday 00:00:00 local
    pub pool_index: i32,
    pub challenge_type: String,
    pub target: i32,
    pub current: i32,
    pub completed: bool,
    pub claimed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
