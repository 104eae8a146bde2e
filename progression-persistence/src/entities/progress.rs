//! Progress entity - the per-user ledger row

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `achievements` and `unlocked_titles` are JSON-encoded string lists;
/// both are append-only through the repository.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub xp: i64,
    pub level: i32,
    pub coins: i64,
    #[sea_orm(column_type = "Text")]
    pub achievements: String,
    #[sea_orm(column_type = "Text")]
    pub unlocked_titles: String,
    pub active_title: Option<String>,
    pub weekly_xp: i64,
    pub monthly_xp: i64,
    pub is_premium: bool,
    pub premium_since: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
