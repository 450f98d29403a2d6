//! Reminder selection - who forgot to log time on a working day.
//!
//! Delivering the reminder (and skipping public holidays) is up to the caller;
//! this module only picks the recipients.

use crate::{
    core::deadline::bounded,
    entities::{time_entry, user},
    errors::Result,
};
use chrono::{Datelike, NaiveDate, Weekday};
use sea_orm::{QueryOrder, prelude::*, sea_query::Query};
use tracing::{debug, instrument};

/// Active users with no time entry on `date`, ordered by id.
///
/// Saturdays and Sundays are never working days, so they yield nobody.
#[instrument(skip(db))]
pub async fn users_without_entries(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Vec<user::Model>> {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        debug!(%date, "weekend, no reminders");
        return Ok(Vec::new());
    }

    bounded("users_without_entries", async {
        let logged = Query::select()
            .column(time_entry::Column::UserId)
            .from(time_entry::Entity)
            .and_where(time_entry::Column::Date.eq(date))
            .to_owned();

        let users = user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .filter(user::Column::Id.not_in_subquery(logged))
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?;
        debug!(%date, count = users.len(), "selected users for reminder");
        Ok(users)
    })
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::user as users;
    use crate::test_utils::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_selects_active_users_without_entries() -> Result<()> {
        let (db, alice, leaf) = setup_with_leaf().await?;
        let bob = create_test_user(&db, "Bob").await?;
        let carol = create_test_user(&db, "Carol").await?;
        let dave = create_test_user(&db, "Dave").await?;
        users::set_active(&db, dave.id, false).await?;

        let monday = day(2024, 3, 18);
        create_test_entry(&db, alice.id, leaf.id, monday, "1h").await?;
        create_test_entry(&db, bob.id, leaf.id, day(2024, 3, 15), "1h").await?;

        let ids: Vec<i64> = users_without_entries(&db, monday)
            .await?
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![bob.id, carol.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_weekends_are_skipped() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "Alice").await?;

        assert!(users_without_entries(&db, day(2024, 3, 16)).await?.is_empty());
        assert!(users_without_entries(&db, day(2024, 3, 17)).await?.is_empty());
        assert_eq!(users_without_entries(&db, day(2024, 3, 15)).await?.len(), 1);
        Ok(())
    }
}
