//! Expected working hours per weekday.
//!
//! Every user has exactly one row per weekday (0 = Sunday through 6 = Saturday).
//! The rows are seeded at registration and serve as the "max" baseline of daily
//! and monthly summaries.

use crate::{
    core::deadline::bounded,
    duration::WorkDuration,
    entities::weekday_hours,
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Expected duration for one weekday.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayHours {
    /// Day of week, 0 = Sunday
    pub weekday: u32,
    /// Expected working time
    pub hours: WorkDuration,
}

/// Schedule given to every new user: Monday to Thursday 7h30m, Friday 7h,
/// weekends off.
#[must_use]
pub const fn default_schedule() -> [WeekdayHours; 7] {
    const fn day(weekday: u32, hours: WorkDuration) -> WeekdayHours {
        WeekdayHours { weekday, hours }
    }
    let long_day = WorkDuration::from_hours_minutes(7, 30);
    [
        day(0, WorkDuration::ZERO),
        day(1, long_day),
        day(2, long_day),
        day(3, long_day),
        day(4, long_day),
        day(5, WorkDuration::from_hours_minutes(7, 0)),
        day(6, WorkDuration::ZERO),
    ]
}

fn weekday_column(weekday: u32) -> Result<i32> {
    if weekday > 6 {
        return Err(Error::InvalidWeekday { weekday });
    }
    i32::try_from(weekday).map_err(|_| Error::InvalidWeekday { weekday })
}

/// Inserts the default schedule for a freshly registered user.
///
/// Runs on whatever connection it is given so registration can include it in
/// its transaction.
pub async fn seed_default_weekdays<C>(db: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = default_schedule()
        .into_iter()
        .map(|day| {
            Ok(weekday_hours::ActiveModel {
                user_id: Set(user_id),
                weekday: Set(weekday_column(day.weekday)?),
                hours: Set(day.hours),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    weekday_hours::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    debug!(user_id, "seeded default weekday hours");
    Ok(())
}

/// Expected duration for one user on one weekday.
///
/// Fails with `WeekdayHoursMissing` when the row does not exist.
pub async fn expected_hours<C>(db: &C, user_id: i64, weekday: u32) -> Result<WorkDuration>
where
    C: ConnectionTrait,
{
    weekday_hours::Entity::find_by_id((user_id, weekday_column(weekday)?))
        .one(db)
        .await?
        .map(|row| row.hours)
        .ok_or(Error::WeekdayHoursMissing { user_id, weekday })
}

/// All weekday rows of a user in ascending weekday order.
#[instrument(skip(db))]
pub async fn all_weekdays(db: &DatabaseConnection, user_id: i64) -> Result<Vec<WeekdayHours>> {
    bounded("all_weekdays", async {
        let rows = weekday_hours::Entity::find()
            .filter(weekday_hours::Column::UserId.eq(user_id))
            .order_by_asc(weekday_hours::Column::Weekday)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                u32::try_from(row.weekday).ok().map(|weekday| WeekdayHours {
                    weekday,
                    hours: row.hours,
                })
            })
            .collect())
    })
    .await
}

/// Updates several weekdays at once.
///
/// Each weekday is updated on its own statement inside one transaction; if any
/// weekday is out of range or has no row, nothing is changed.
#[instrument(skip(db))]
pub async fn update_weekdays(
    db: &DatabaseConnection,
    user_id: i64,
    days: &[WeekdayHours],
) -> Result<()> {
    bounded("update_weekdays", async {
        for day in days {
            weekday_column(day.weekday)?;
        }

        let txn = db.begin().await?;
        for day in days {
            let result = weekday_hours::Entity::update_many()
                .col_expr(weekday_hours::Column::Hours, Expr::value(day.hours))
                .filter(weekday_hours::Column::UserId.eq(user_id))
                .filter(weekday_hours::Column::Weekday.eq(weekday_column(day.weekday)?))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                return Err(Error::WeekdayHoursMissing {
                    user_id,
                    weekday: day.weekday,
                });
            }
        }
        txn.commit().await?;

        info!(user_id, updated = days.len(), "weekday hours updated");
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_registration_seeds_all_weekdays() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;

        let days = all_weekdays(&db, user.id).await?;
        assert_eq!(days.len(), 7);
        let weekdays: Vec<u32> = days.iter().map(|d| d.weekday).collect();
        assert_eq!(weekdays, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(days, default_schedule().to_vec());

        assert_eq!(days[0].hours.to_string(), "0s");
        assert_eq!(days[1].hours.to_string(), "7h30m0s");
        assert_eq!(days[4].hours.to_string(), "7h30m0s");
        assert_eq!(days[5].hours.to_string(), "7h0m0s");
        assert_eq!(days[6].hours.to_string(), "0s");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_weekdays() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Bob").await?;

        update_weekdays(
            &db,
            user.id,
            &[
                WeekdayHours {
                    weekday: 5,
                    hours: WorkDuration::from_hours_minutes(6, 0),
                },
                WeekdayHours {
                    weekday: 6,
                    hours: WorkDuration::from_hours_minutes(2, 0),
                },
            ],
        )
        .await?;

        assert_eq!(
            expected_hours(&db, user.id, 5).await?,
            WorkDuration::from_hours_minutes(6, 0)
        );
        assert_eq!(
            expected_hours(&db, user.id, 6).await?,
            WorkDuration::from_hours_minutes(2, 0)
        );
        assert_eq!(
            expected_hours(&db, user.id, 1).await?,
            WorkDuration::from_hours_minutes(7, 30)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_weekdays_rolls_back_on_failure() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Carol").await?;
        let other = create_test_user(&db, "Dave").await?;

        // Out-of-range weekday is rejected before anything is written
        let err = update_weekdays(
            &db,
            user.id,
            &[WeekdayHours {
                weekday: 7,
                hours: WorkDuration::ZERO,
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidWeekday { weekday: 7 }));

        // A user without rows fails on the first update, leaving others untouched
        weekday_hours::Entity::delete_many()
            .filter(weekday_hours::Column::UserId.eq(other.id))
            .filter(weekday_hours::Column::Weekday.eq(3))
            .exec(&db)
            .await?;
        let err = update_weekdays(
            &db,
            other.id,
            &[
                WeekdayHours {
                    weekday: 1,
                    hours: WorkDuration::from_hours_minutes(1, 0),
                },
                WeekdayHours {
                    weekday: 3,
                    hours: WorkDuration::from_hours_minutes(1, 0),
                },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::WeekdayHoursMissing { weekday: 3, .. }));
        assert_eq!(
            expected_hours(&db, other.id, 1).await?,
            WorkDuration::from_hours_minutes(7, 30)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_expected_hours_missing_row() -> Result<()> {
        let db = setup_test_db().await?;
        let err = expected_hours(&db, 42, 2).await.unwrap_err();
        assert!(matches!(
            err,
            Error::WeekdayHoursMissing {
                user_id: 42,
                weekday: 2
            }
        ));
        Ok(())
    }
}
