//! Weekday hours entity - Expected working time per user and day of week.
//!
//! Exactly one row exists per user and weekday (0 = Sunday through 6 = Saturday),
//! seeded at registration.

use crate::duration::WorkDuration;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekday hours database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users_hours")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Day of week, 0 = Sunday
    #[sea_orm(primary_key, auto_increment = false)]
    pub weekday: i32,
    /// Expected working time on that day
    pub hours: WorkDuration,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
