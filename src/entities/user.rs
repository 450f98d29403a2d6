//! User entity - A person logging time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role given to every self-registered user
pub const ROLE_EMPLOYEE: &str = "employee";
/// Role allowed to run cross-user listings
pub const ROLE_ADMIN: &str = "admin";

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, matched by the entry listing's free-text query
    pub name: String,
    /// Login email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// `"employee"` or `"admin"`
    pub role: String,
    /// Inactive users are skipped by reminders
    pub is_active: bool,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
    #[sea_orm(has_many = "super::weekday_hours::Entity")]
    WeekdayHours,
    #[sea_orm(has_many = "super::category_follow::Entity")]
    Follows,
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::weekday_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeekdayHours.def()
    }
}

impl Related<super::category_follow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Follows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
