//! Category entity - A node in the work category forest.
//!
//! Categories point at an optional parent, forming a forest. They are never
//! deleted; the `is_retired` flag disables a category and everything below it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title (e.g., "Internal", "Customer X")
    pub title: String,
    /// Parent category, None for roots
    pub parent_id: Option<i64>,
    /// Soft-disable flag, inherited by all descendants
    pub is_retired: bool,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each child category belongs to one parent
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
    /// One category has many time entries
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
    /// One category has many follow links
    #[sea_orm(has_many = "super::category_follow::Entity")]
    Followers,
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::category_follow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Followers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
