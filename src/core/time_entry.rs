//! Time entry business logic - Handles logging, correcting and listing work.
//!
//! Mutations are scoped by both entry id and owning user id: an entry that does
//! not belong to the caller is indistinguishable from one that does not exist.
//! Whether the category is a followed, non-retired leaf is checked by callers,
//! not here.

use crate::{
    core::{deadline::bounded, filters::TimeEntryFilters},
    duration::WorkDuration,
    entities::{category, time_entry, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    Condition, FromQueryResult, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Payload for [`register`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTimeEntryInput {
    /// Category to log against
    pub category_id: i64,
    /// Day the work happened on
    pub date: NaiveDate,
    /// Time spent
    pub duration: WorkDuration,
    /// What was done
    #[serde(default)]
    pub description: String,
}

/// Payload for [`update`]. Category and date are fixed once logged.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryInput {
    /// New duration
    pub duration: WorkDuration,
    /// New description
    #[serde(default)]
    pub description: String,
}

/// A time entry joined with its category's current title.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRow {
    pub id: i64,
    pub category_id: i64,
    /// Category title at read time
    pub category: String,
    pub user_id: i64,
    pub date: NaiveDate,
    pub duration: WorkDuration,
    pub description: String,
}

/// A row of the cross-user listing, with category title and user name.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryListing {
    pub id: i64,
    pub category_id: i64,
    pub category: String,
    pub user_id: i64,
    pub user_name: String,
    pub date: NaiveDate,
    pub duration: WorkDuration,
    pub description: String,
}

const ENTRY_COLUMNS: [time_entry::Column; 6] = [
    time_entry::Column::Id,
    time_entry::Column::CategoryId,
    time_entry::Column::UserId,
    time_entry::Column::Date,
    time_entry::Column::Duration,
    time_entry::Column::Description,
];

/// Logs a new time entry for `user_id`.
#[instrument(skip(db, input), fields(category_id = input.category_id, date = %input.date))]
pub async fn register(
    db: &DatabaseConnection,
    user_id: i64,
    input: RegisterTimeEntryInput,
) -> Result<time_entry::Model> {
    bounded("register_time_entry", async move {
        let model = time_entry::ActiveModel {
            category_id: Set(input.category_id),
            user_id: Set(user_id),
            date: Set(input.date),
            duration: Set(input.duration),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(entry_id = model.id, duration = %model.duration, "time entry registered");
        Ok(model)
    })
    .await
}

/// Changes duration and description of an entry owned by `user_id`.
///
/// Fails with `TimeEntryNotFound` when the entry does not exist or belongs to
/// someone else.
#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    user_id: i64,
    entry_id: i64,
    input: UpdateTimeEntryInput,
) -> Result<time_entry::Model> {
    bounded("update_time_entry", async move {
        let txn = db.begin().await?;

        let result = time_entry::Entity::update_many()
            .col_expr(time_entry::Column::Duration, Expr::value(input.duration))
            .col_expr(time_entry::Column::Description, Expr::value(input.description))
            .filter(time_entry::Column::Id.eq(entry_id))
            .filter(time_entry::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::TimeEntryNotFound { id: entry_id });
        }

        let model = time_entry::Entity::find_by_id(entry_id)
            .one(&txn)
            .await?
            .ok_or(Error::TimeEntryNotFound { id: entry_id })?;
        txn.commit().await?;

        info!(entry_id, "time entry updated");
        Ok(model)
    })
    .await
}

/// Deletes an entry owned by `user_id`.
///
/// Fails with `NotDeleted` when no row matched both the id and the owner.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, user_id: i64, entry_id: i64) -> Result<()> {
    bounded("delete_time_entry", async {
        let result = time_entry::Entity::delete_many()
            .filter(time_entry::Column::Id.eq(entry_id))
            .filter(time_entry::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::NotDeleted { id: entry_id });
        }
        info!(entry_id, "time entry deleted");
        Ok(())
    })
    .await
}

/// Entries of one user on one day with category titles, newest first.
pub async fn entries_for_day<C>(db: &C, user_id: i64, date: NaiveDate) -> Result<Vec<TimeEntryRow>>
where
    C: ConnectionTrait,
{
    time_entry::Entity::find()
        .select_only()
        .columns(ENTRY_COLUMNS)
        .column_as(category::Column::Title, "category")
        .inner_join(category::Entity)
        .filter(time_entry::Column::UserId.eq(user_id))
        .filter(time_entry::Column::Date.eq(date))
        .order_by_desc(time_entry::Column::Id)
        .into_model::<TimeEntryRow>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Cross-user listing, newest date first.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filters: &TimeEntryFilters,
) -> Result<Vec<TimeEntryListing>> {
    filters.validate()?;

    bounded("list_time_entries", async {
        let mut select = time_entry::Entity::find()
            .select_only()
            .columns(ENTRY_COLUMNS)
            .column_as(category::Column::Title, "category")
            .column_as(user::Column::Name, "user_name")
            .inner_join(category::Entity)
            .inner_join(user::Entity);

        let query = filters.query.trim();
        if !query.is_empty() {
            select = select.filter(
                Condition::any()
                    .add(time_entry::Column::Description.contains(query))
                    .add(user::Column::Name.contains(query))
                    .add(category::Column::Title.contains(query)),
            );
        }
        if !filters.category_ids.is_empty() {
            select = select
                .filter(time_entry::Column::CategoryId.is_in(filters.category_ids.iter().copied()));
        }
        if !filters.user_ids.is_empty() {
            select = select.filter(time_entry::Column::UserId.is_in(filters.user_ids.iter().copied()));
        }
        if let Some(from) = filters.from_date {
            select = select.filter(time_entry::Column::Date.gte(from));
        }
        if let Some(to) = filters.to_date {
            select = select.filter(time_entry::Column::Date.lte(to));
        }

        let entries = select
            .order_by_desc(time_entry::Column::Date)
            .order_by_desc(time_entry::Column::Id)
            .into_model::<TimeEntryListing>()
            .all(db)
            .await?;
        debug!(count = entries.len(), "listed time entries");
        Ok(entries)
    })
    .await
}

/// Total time ever logged against one category, across all users.
#[instrument(skip(db))]
pub async fn category_total(db: &DatabaseConnection, category_id: i64) -> Result<WorkDuration> {
    bounded("category_total", async {
        let total = time_entry::Entity::find()
            .select_only()
            .column_as(Expr::col(time_entry::Column::Duration).sum(), "total")
            .filter(time_entry::Column::CategoryId.eq(category_id))
            .into_tuple::<Option<i64>>()
            .one(db)
            .await?;

        Ok(WorkDuration::from_nanos(total.flatten().unwrap_or(0)))
    })
    .await
}
