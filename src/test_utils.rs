//! Shared test utilities for `BasketBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating users and pantry items with sensible defaults.

use crate::{
    config::Settings,
    db,
    entities::{item, user},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, Set, prelude::Uuid};
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Cheapest work factor bcrypt accepts.
pub const TEST_COST: u32 = 4;

/// Default settings with the cheapest bcrypt cost.
pub fn test_settings() -> Settings {
    Settings {
        password_cost: TEST_COST,
        ..Settings::default()
    }
}

/// Inserts a user directly, skipping hashing.
///
/// # Defaults
/// * `name`: "Test User"
/// * `hashed_password`: a placeholder, not a real bcrypt hash
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    db::users::create(db, Uuid::new_v4(), "Test User", email, "not-a-real-hash").await
}

/// Creates a pantry item priced at 1.00.
pub async fn create_test_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
) -> Result<item::Model> {
    db::items::create(db, user_id, name, 1.0).await
}

/// Creates a pantry item with a custom price and purchase count.
/// Use this when ordering by `times_bought` matters.
pub async fn create_custom_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    price: f64,
    times_bought: i32,
) -> Result<item::Model> {
    let item = item::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        name: Set(name.to_string()),
        name_key: Set(item::name_key(name)),
        price: Set(price),
        times_bought: Set(times_bought),
        created_at: Set(Utc::now()),
        last_purchase_date: Set(None),
    }
    .insert(db)
    .await?;
    Ok(item)
}

/// Sets up a complete test environment with one user.
/// Returns (db, user) for the common single-tenant scenario.
pub async fn setup_with_user() -> Result<(DatabaseConnection, user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "alice@example.com").await?;
    Ok((db, user))
}
