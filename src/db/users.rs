//! User store: credential rows and duplicate-email classification.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DbErr, Set, SqlErr, prelude::*};
use tracing::{debug, info, instrument, warn};

/// True when `err` is the unique constraint on `users.email`.
///
/// Classification uses the driver's structured error code; the constraint
/// detail is only consulted to tell the email constraint apart from any other
/// unique key on the table.
fn is_duplicate_email(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email")
    )
}

/// Inserts a user row.
///
/// # Errors
/// `DuplicateEmail` if the email is already registered.
#[instrument(skip(db, hashed_password))]
pub async fn create<C>(
    db: &C,
    id: Uuid,
    name: &str,
    email: &str,
    hashed_password: &str,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = user::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        hashed_password: Set(hashed_password.to_string()),
        created_at: Set(Utc::now()),
    };

    match user.insert(db).await {
        Ok(user) => {
            info!("Created user {}", user.id);
            Ok(user)
        }
        Err(e) if is_duplicate_email(&e) => {
            warn!("Registration rejected, email already in use");
            Err(Error::DuplicateEmail)
        }
        Err(e) => Err(e.into()),
    }
}

/// Looks a user up by email.
#[instrument(skip(db))]
pub async fn get_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let user = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    debug!("User lookup by email found: {}", user.is_some());
    Ok(user)
}

/// Looks a user up by id.
#[instrument(skip(db))]
pub async fn get_by_id<C>(db: &C, id: Uuid) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(id).one(db).await.map_err(Into::into)
}
