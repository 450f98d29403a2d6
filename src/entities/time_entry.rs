//! Time entry entity - One block of work logged by a user against a category.
//!
//! Each entry has a `category_id`, `user_id`, calendar `date`, `duration` and a
//! free-text description. Only the owning user may change or remove it.

use crate::duration::WorkDuration;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Time entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_entries")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category the time was logged against
    pub category_id: i64,
    /// Owning user
    pub user_id: i64,
    /// Calendar day the work happened on
    pub date: Date,
    /// Elapsed time, stored as nanoseconds
    pub duration: WorkDuration,
    /// What was done
    pub description: String,
}

/// Defines relationships between `TimeEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each entry belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
