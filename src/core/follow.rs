//! Follow business logic - which categories a user has subscribed to.
//!
//! Following a category unlocks every leaf below it for time logging. Each
//! (user, category) pair exists at most once; the storage primary key enforces it.

use crate::{
    core::deadline::bounded,
    entities::{category, category_follow},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, prelude::*};
use tracing::{info, instrument};

/// Subscribes a user to a category.
///
/// # Errors
/// * `CategoryNotFound` when the category does not exist
/// * `AlreadyFollowed` when the user already follows it
/// * `UserNotFound` when the user does not exist
#[instrument(skip(db))]
pub async fn follow(db: &DatabaseConnection, category_id: i64, user_id: i64) -> Result<()> {
    bounded("follow_category", async {
        category::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or(Error::CategoryNotFound { id: category_id })?;

        let link = category_follow::ActiveModel {
            user_id: Set(user_id),
            category_id: Set(category_id),
        };

        match category_follow::Entity::insert(link)
            .exec_without_returning(db)
            .await
        {
            Ok(0) => Err(Error::CategoryNotFollowed {
                category_id,
                user_id,
            }),
            Ok(_) => {
                info!(category_id, user_id, "category followed");
                Ok(())
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(Error::AlreadyFollowed {
                    category_id,
                    user_id,
                }),
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => Err(Error::UserNotFound {
                    id: user_id.to_string(),
                }),
                _ => Err(err.into()),
            },
        }
    })
    .await
}

/// Removes a user's subscription to a category.
///
/// Fails with `NotFollowingCategory` when there was nothing to remove.
#[instrument(skip(db))]
pub async fn unfollow(db: &DatabaseConnection, category_id: i64, user_id: i64) -> Result<()> {
    bounded("unfollow_category", async {
        let result = category_follow::Entity::delete_many()
            .filter(category_follow::Column::UserId.eq(user_id))
            .filter(category_follow::Column::CategoryId.eq(category_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::NotFollowingCategory {
                category_id,
                user_id,
            });
        }
        info!(category_id, user_id, "category unfollowed");
        Ok(())
    })
    .await
}

/// Ids of the categories a user follows directly, ascending.
pub async fn followed_category_ids<C>(db: &C, user_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    category_follow::Entity::find()
        .select_only()
        .column(category_follow::Column::CategoryId)
        .filter(category_follow::Column::UserId.eq(user_id))
        .order_by_asc(category_follow::Column::CategoryId)
        .into_tuple::<i64>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorKind;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_follow_twice_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Alice").await?;
        let category = create_test_category(&db, "Internal", None).await?;

        follow(&db, category.id, user.id).await?;
        let err = follow(&db, category.id, user.id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyFollowed { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(followed_category_ids(&db, user.id).await?, vec![category.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unfollow_without_follow_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Bob").await?;
        let category = create_test_category(&db, "Internal", None).await?;

        let err = unfollow(&db, category.id, user.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFollowingCategory { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_then_unfollow() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Carol").await?;
        let first = create_test_category(&db, "First", None).await?;
        let second = create_test_category(&db, "Second", None).await?;

        follow(&db, second.id, user.id).await?;
        follow(&db, first.id, user.id).await?;
        assert_eq!(
            followed_category_ids(&db, user.id).await?,
            vec![first.id, second.id]
        );

        unfollow(&db, first.id, user.id).await?;
        assert_eq!(followed_category_ids(&db, user.id).await?, vec![second.id]);

        // Following again after unfollowing is allowed
        follow(&db, first.id, user.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_unknown_targets() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Dave").await?;
        let category = create_test_category(&db, "Internal", None).await?;

        let err = follow(&db, 999, user.id).await.unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound { id: 999 }));

        let err = follow(&db, category.id, 999).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));
        Ok(())
    }
}
