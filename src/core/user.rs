//! Account business logic - registration, login and per-field form checks.

use crate::{
    config::Settings,
    db,
    errors::{Error, Result},
    models::User,
    validator::{self, Validator},
};
use sea_orm::{DatabaseConnection, prelude::Uuid};
use tokio::task;
use tracing::{info, instrument, warn};

/// Registers a new account.
///
/// All three fields are checked before anything else happens, and every
/// failing field is reported. The password is bcrypt-hashed off the async
/// executor at `settings.password_cost`.
///
/// # Errors
/// `Validation` for bad input, `DuplicateEmail` if the email is taken.
#[instrument(skip(db, settings, password))]
pub async fn register(
    db: &DatabaseConnection,
    settings: &Settings,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let mut v = Validator::new();
    validator::validate_name(&mut v, name);
    validator::validate_email(&mut v, email);
    validator::validate_password(&mut v, password);
    v.into_result()?;

    let cost = settings.password_cost;
    let password = password.to_string();
    let hashed = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    let user = db::users::create(db, Uuid::new_v4(), name, email, &hashed).await?;
    info!("Registered user {}", user.id);
    Ok(user.into())
}

/// Verifies credentials and returns the account.
///
/// An unknown email still pays for one bcrypt hash at `settings.password_cost`,
/// so both failures take about as long as each other.
///
/// # Errors
/// `InvalidCredentials` for an unknown email and for a wrong password alike.
#[instrument(skip(db, settings, password))]
pub async fn login(
    db: &DatabaseConnection,
    settings: &Settings,
    email: &str,
    password: &str,
) -> Result<User> {
    let Some(user) = db::users::get_by_email(db, email).await? else {
        let cost = settings.password_cost;
        let password = password.to_string();
        let _ = task::spawn_blocking(move || bcrypt::hash(password, cost)).await?;
        warn!("Login failed");
        return Err(Error::InvalidCredentials);
    };

    let password = password.to_string();
    let hash = user.hashed_password.clone();
    let verified = task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;

    // A malformed stored hash is treated like a mismatch
    if !verified.unwrap_or(false) {
        warn!("Login failed");
        return Err(Error::InvalidCredentials);
    }

    info!("User {} logged in", user.id);
    Ok(user.into())
}

/// Re-reads the account bound to a session.
///
/// # Errors
/// `UserNotFound` if the account no longer exists.
pub async fn get_user(db: &DatabaseConnection, user_id: Uuid) -> Result<User> {
    db::users::get_by_id(db, user_id)
        .await?
        .map(User::from)
        .ok_or(Error::UserNotFound)
}

fn single_field(field: &str, check: impl FnOnce(&mut Validator)) -> Option<String> {
    let mut v = Validator::new();
    check(&mut v);
    v.get_error(field).map(str::to_string)
}

/// Live check for the name field.
#[must_use]
pub fn validate_name(name: &str) -> Option<String> {
    single_field("name", |v| validator::validate_name(v, name))
}

/// Live check for the email field.
#[must_use]
pub fn validate_email(email: &str) -> Option<String> {
    single_field("email", |v| validator::validate_email(v, email))
}

/// Live check for the password field.
#[must_use]
pub fn validate_password(password: &str) -> Option<String> {
    single_field("password", |v| validator::validate_password(v, password))
}
