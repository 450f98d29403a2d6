//! User business logic - Registration and lookup.
//!
//! Registering a user also seeds the default weekday schedule, in the same
//! transaction, so every user always has all seven expected-hours rows.

use crate::{
    core::{deadline::bounded, hours},
    entities::user,
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 50;

/// Payload for [`register`].
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
}

fn validate(input: &RegisterUserInput) -> Result<(String, String)> {
    let name = input.name.trim();
    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        return Err(Error::InvalidUserInput {
            message: format!(
                "Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
            ),
        });
    }

    let email = input.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(Error::InvalidUserInput {
            message: format!("Invalid email address: {email}"),
        });
    }

    Ok((name.to_string(), email.to_string()))
}

/// Registers an employee and seeds their weekday hours.
///
/// # Errors
/// * `InvalidUserInput` for a name outside 3 to 50 characters or a malformed email
/// * `DuplicateEmail` when the email is already registered
#[instrument(skip(db, input))]
pub async fn register(db: &DatabaseConnection, input: RegisterUserInput) -> Result<user::Model> {
    let (name, email) = validate(&input)?;

    bounded("register_user", async move {
        let txn = db.begin().await?;

        let inserted = user::ActiveModel {
            name: Set(name),
            email: Set(email.clone()),
            role: Set(user::ROLE_EMPLOYEE.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let model = match inserted {
            Ok(model) => model,
            Err(err) => {
                return Err(match err.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateEmail { email },
                    _ => err.into(),
                });
            }
        };

        hours::seed_default_weekdays(&txn, model.id).await?;
        txn.commit().await?;

        info!(user_id = model.id, "user registered");
        Ok(model)
    })
    .await
}

/// Looks up a user by id.
#[instrument(skip(db))]
pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<user::Model> {
    bounded("get_user", async {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::UserNotFound { id: id.to_string() })
    })
    .await
}

/// Looks up a user by email, ignoring surrounding whitespace.
#[instrument(skip(db))]
pub async fn get_by_email(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let email = email.trim();
    bounded("get_user_by_email", async {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or_else(|| Error::UserNotFound {
                id: email.to_string(),
            })
    })
    .await
}

/// Every user, ordered by id.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    bounded("list_users", async {
        user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
            .map_err(Into::into)
    })
    .await
}

/// Marks a user active or inactive. Inactive users get no reminders.
#[instrument(skip(db))]
pub async fn set_active(db: &DatabaseConnection, id: i64, active: bool) -> Result<()> {
    bounded("set_user_active", async {
        let result = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(active))
            .filter(user::Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::UserNotFound { id: id.to_string() });
        }
        info!(user_id = id, active, "user activity changed");
        Ok(())
    })
    .await
}
