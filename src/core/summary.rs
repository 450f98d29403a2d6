//! Summary business logic - Logged time compared against expected hours.
//!
//! A day summary joins one user's entries for a date with the expected duration
//! for that weekday. A month summary computes every day of the month
//! concurrently and adds them up.

use crate::{
    core::{
        deadline::bounded,
        hours,
        time_entry::{self, TimeEntryRow},
    },
    duration::WorkDuration,
    errors::{Error, Result},
};
use chrono::{Datelike, Month, NaiveDate};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Logged and expected time for one user on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDay {
    pub date: NaiveDate,
    /// Lowercase English weekday name, e.g. `"friday"`
    pub weekday: String,
    /// Sum of the day's entry durations
    pub total_hours: WorkDuration,
    /// Expected duration for the weekday
    pub max_hours: WorkDuration,
    /// The day's entries, newest first
    pub time_entries: Vec<TimeEntryRow>,
}

/// Logged and expected time for one user over a calendar month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMonth {
    /// Lowercase English month name, e.g. `"february"`
    pub month: String,
    pub total_hours: WorkDuration,
    pub max_hours: WorkDuration,
    /// One summary per calendar day, ascending
    pub days: Vec<SummaryDay>,
}

/// Converts a 1-based month number from the boundary.
pub fn parse_month(month: u32, year: i32) -> Result<Month> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or(Error::InvalidMonth { month, year })
}

/// Every calendar day of `month`, ascending.
///
/// The last day is the one before the first of the following month, so leap
/// years need no special casing.
pub fn days_in_month(month: Month, year: i32) -> Result<Vec<NaiveDate>> {
    let number = month.number_from_month();
    let invalid = || Error::InvalidMonth {
        month: number,
        year,
    };

    let first = NaiveDate::from_ymd_opt(year, number, 1).ok_or_else(invalid)?;
    let next_first = match month {
        Month::December => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        _ => NaiveDate::from_ymd_opt(year, number + 1, 1),
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;

    Ok(first.iter_days().take_while(|day| *day <= last).collect())
}

async fn compute_day(db: &DatabaseConnection, user_id: i64, date: NaiveDate) -> Result<SummaryDay> {
    let weekday = date.weekday();

    let txn = db.begin().await?;
    let max_hours =
        hours::expected_hours(&txn, user_id, weekday.num_days_from_sunday()).await?;
    let time_entries = time_entry::entries_for_day(&txn, user_id, date).await?;
    txn.commit().await?;

    let total_hours = time_entries.iter().map(|entry| entry.duration).sum();
    Ok(SummaryDay {
        date,
        weekday: date.format("%A").to_string().to_lowercase(),
        total_hours,
        max_hours,
        time_entries,
    })
}

/// Summary of one user's day.
///
/// Fails with `WeekdayHoursMissing` when the user has no expected hours for the
/// date's weekday.
#[instrument(skip(db))]
pub async fn summary_day(
    db: &DatabaseConnection,
    user_id: i64,
    date: NaiveDate,
) -> Result<SummaryDay> {
    bounded("summary_day", compute_day(db, user_id, date)).await
}

/// Summary of one user's month.
///
/// Days are computed concurrently. The first failing day aborts the remaining
/// ones and its error is returned; no partial summary is produced.
#[instrument(skip(db))]
pub async fn summary_month(
    db: &DatabaseConnection,
    user_id: i64,
    month: Month,
    year: i32,
) -> Result<SummaryMonth> {
    let dates = days_in_month(month, year)?;

    bounded("summary_month", async move {
        let mut tasks = JoinSet::new();
        for date in dates {
            let db = db.clone();
            tasks.spawn(async move { compute_day(&db, user_id, date).await });
        }

        let mut days = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(Error::from).and_then(|day| day) {
                Ok(day) => days.push(day),
                Err(err) => {
                    warn!(user_id, error = %err, "day summary failed, aborting month");
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        days.sort_by_key(|day| day.date);
        let total_hours = days.iter().map(|day| day.total_hours).sum();
        let max_hours = days.iter().map(|day| day.max_hours).sum();
        debug!(user_id, days = days.len(), total = %total_hours, "month summarized");

        Ok(SummaryMonth {
            month: month.name().to_lowercase(),
            total_hours,
            max_hours,
            days,
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::time_entry::RegisterTimeEntryInput;
    use crate::entities::weekday_hours;
    use crate::errors::ErrorKind;
    use crate::test_utils::*;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_summary_day_single_entry() -> Result<()> {
        let (db, user, leaf) = setup_with_leaf().await?;
        time_entry::register(
            &db,
            user.id,
            RegisterTimeEntryInput {
                category_id: leaf.id,
                date: day(2024, 3, 15),
                duration: "2h30m".parse()?,
                description: "x".to_string(),
            },
        )
        .await?;

        let summary = summary_day(&db, user.id, day(2024, 3, 15)).await?;
        assert_eq!(summary.weekday, "friday");
        assert_eq!(summary.time_entries.len(), 1);
        assert_eq!(summary.time_entries[0].description, "x");
        assert_eq!(summary.total_hours.to_string(), "2h30m0s");
        assert_eq!(summary.max_hours.to_string(), "7h0m0s");
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_day_sums_entries() -> Result<()> {
        let (db, user, leaf) = setup_with_leaf().await?;
        let date = day(2024, 3, 18);
        create_test_entry(&db, user.id, leaf.id, date, "1h15m").await?;
        create_test_entry(&db, user.id, leaf.id, date, "45m").await?;
        create_test_entry(&db, user.id, leaf.id, day(2024, 3, 19), "8h").await?;

        let summary = summary_day(&db, user.id, date).await?;
        assert_eq!(summary.weekday, "monday");
        assert_eq!(summary.time_entries.len(), 2);
        assert_eq!(summary.total_hours, WorkDuration::from_hours_minutes(2, 0));
        assert_eq!(summary.max_hours, WorkDuration::from_hours_minutes(7, 30));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_day_without_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        let summary = summary_day(&db, user.id, day(2024, 3, 17)).await?;
        assert_eq!(summary.weekday, "sunday");
        assert!(summary.time_entries.is_empty());
        assert!(summary.total_hours.is_zero());
        assert_eq!(summary.total_hours.to_string(), "0s");
        assert!(summary.max_hours.is_zero());
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_day_missing_hours() -> Result<()> {
        let db = setup_test_db().await?;
        let err = summary_day(&db, 77, day(2024, 3, 15)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::WeekdayHoursMissing {
                user_id: 77,
                weekday: 5
            }
        ));
        Ok(())
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(Month::February, 2024).unwrap().len(), 29);
        assert_eq!(days_in_month(Month::February, 2023).unwrap().len(), 28);
        assert_eq!(days_in_month(Month::April, 2024).unwrap().len(), 30);

        let december = days_in_month(Month::December, 2024).unwrap();
        assert_eq!(december.len(), 31);
        assert_eq!(december[0], day(2024, 12, 1));
        assert_eq!(december[30], day(2024, 12, 31));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(2, 2024).unwrap(), Month::February);
        assert_eq!(parse_month(12, 2024).unwrap(), Month::December);

        let err = parse_month(13, 2024).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMonth {
                month: 13,
                year: 2024
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(parse_month(0, 2024).is_err());
    }

    #[tokio::test]
    async fn test_summary_month_february_leap_year() -> Result<()> {
        let (db, user, leaf) = setup_with_leaf().await?;
        create_test_entry(&db, user.id, leaf.id, day(2024, 2, 29), "3h").await?;
        create_test_entry(&db, user.id, leaf.id, day(2024, 2, 1), "1h30m").await?;
        create_test_entry(&db, user.id, leaf.id, day(2024, 3, 1), "5h").await?;

        let summary = summary_month(&db, user.id, Month::February, 2024).await?;
        assert_eq!(summary.month, "february");
        assert_eq!(summary.days.len(), 29);

        let dates: Vec<NaiveDate> = summary.days.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(dates[0], day(2024, 2, 1));
        assert_eq!(dates[28], day(2024, 2, 29));

        let day_total: WorkDuration = summary.days.iter().map(|d| d.total_hours).sum();
        assert_eq!(summary.total_hours, day_total);
        assert_eq!(summary.total_hours.to_string(), "4h30m0s");

        // 21 weekdays: 17 at 7h30m and 4 Fridays at 7h
        assert_eq!(summary.max_hours.to_string(), "155h30m0s");
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_month_fails_fast() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Bob").await?;
        weekday_hours::Entity::delete_many()
            .filter(weekday_hours::Column::UserId.eq(user.id))
            .filter(weekday_hours::Column::Weekday.eq(3))
            .exec(&db)
            .await?;

        let err = summary_month(&db, user.id, Month::March, 2024)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::WeekdayHoursMissing { weekday: 3, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_serializes_camel_case() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Carol").await?;
        let summary = summary_day(&db, user.id, day(2024, 3, 15)).await?;

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["totalHours"], "0s");
        assert_eq!(json["maxHours"], "7h0m0s");
        assert!(json["timeEntries"].as_array().unwrap().is_empty());
        Ok(())
    }
}
