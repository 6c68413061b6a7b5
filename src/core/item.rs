//! Item business logic - pantry search, suggestions and mutation.
//!
//! This module sits between request handling and the item store. It normalises
//! paging input, maps the `orderBy` form value onto a sort key, parses the
//! `"<name> $<price>"` quick-add syntax and applies partial updates.

use crate::{
    config::Settings,
    db,
    entities::item,
    errors::{Error, Result},
    models::{FIRST_PAGE, ItemChanges, ItemOrder, Metadata, round_price},
    validator::{Validator, validate_name},
};
use sea_orm::{DatabaseConnection, prelude::Uuid};
use tracing::{debug, instrument, warn};

/// Splits `"<name> $<price>"` into a trimmed name and a price.
///
/// The price token starts right after the first `$` and runs to the next
/// whitespace. It is cut out of the name; any text after it stays in the name.
/// A missing, unparseable, non-positive or non-finite price becomes `0.0`.
#[must_use]
pub fn parse_item_input(raw: &str) -> (String, f64) {
    let Some((before, after)) = raw.split_once('$') else {
        return (raw.trim().to_string(), 0.0);
    };

    let token_end = after.find(char::is_whitespace).unwrap_or(after.len());
    let (token, rest) = after.split_at(token_end);

    let name = [before.trim(), rest.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let price = token
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
        .map_or(0.0, round_price);

    (name, price)
}

fn check_name(name: &str) -> Result<()> {
    let mut v = Validator::new();
    validate_name(&mut v, name);
    v.into_result()
}

/// Searches the user's pantry.
///
/// `page` below 1 is treated as 1 and `page_size` is clamped to
/// `1..=settings.max_page_size`. Unknown `order_by` values sort by times bought.
#[instrument(skip(db, settings))]
pub async fn search(
    db: &DatabaseConnection,
    settings: &Settings,
    user_id: Uuid,
    query: &str,
    page: u64,
    page_size: u64,
    order_by: &str,
) -> Result<(Metadata, Vec<item::Model>)> {
    let page = page.max(FIRST_PAGE);
    let clamped = settings.clamp_page_size(page_size);
    if clamped != page_size {
        warn!("Requested page size {} clamped to {}", page_size, clamped);
    }

    db::items::search(db, user_id, query, page, clamped, ItemOrder::from(order_by)).await
}

/// First page of the pantry, most-bought first.
pub async fn list_default(
    db: &DatabaseConnection,
    settings: &Settings,
    user_id: Uuid,
) -> Result<(Metadata, Vec<item::Model>)> {
    search(
        db,
        settings,
        user_id,
        "",
        FIRST_PAGE,
        settings.page_size,
        ItemOrder::TimesBought.as_str(),
    )
    .await
}

/// Autocomplete suggestions for the quick-add box.
///
/// An empty query suggests nothing and skips the store entirely.
#[instrument(skip(db, settings))]
pub async fn suggest(
    db: &DatabaseConnection,
    settings: &Settings,
    user_id: Uuid,
    query: &str,
) -> Result<Vec<item::Model>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let (_, items) = db::items::search(
        db,
        user_id,
        query,
        FIRST_PAGE,
        settings.suggestion_limit.max(1),
        ItemOrder::TimesBought,
    )
    .await?;
    debug!("Found {} suggestions for '{}'", items.len(), query);
    Ok(items)
}

/// Fetches one item.
///
/// # Errors
/// `ItemNotFound` if it does not exist or belongs to someone else.
pub async fn get(db: &DatabaseConnection, user_id: Uuid, id: i64) -> Result<item::Model> {
    db::items::get_by_id(db, user_id, id)
        .await?
        .ok_or(Error::ItemNotFound { id })
}

/// Adds an item to the pantry. Duplicate names are allowed.
///
/// # Errors
/// `Validation` for a bad name, `InvalidPrice` for a negative price.
#[instrument(skip(db))]
pub async fn add(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    price: f64,
) -> Result<item::Model> {
    check_name(name)?;
    db::items::create(db, user_id, name, price).await
}

/// Parses `"<name> $<price>"` and adds the result.
pub async fn add_parsed(db: &DatabaseConnection, user_id: Uuid, raw: &str) -> Result<item::Model> {
    let (name, price) = parse_item_input(raw);
    debug!("Parsed item '{}' at ${:.2}", name, price);
    add(db, user_id, &name, price).await
}

/// Applies `changes` to an item; `None` fields are left untouched.
///
/// # Errors
/// `ItemNotFound` if the item is missing or foreign, `Validation` if the new
/// name is invalid, `InvalidPrice` if the new price is negative.
#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    user_id: Uuid,
    id: i64,
    changes: ItemChanges,
) -> Result<item::Model> {
    let mut item = get(db, user_id, id).await?;
    if changes.is_empty() {
        return Ok(item);
    }

    if let Some(name) = changes.name {
        check_name(&name)?;
        item.name = name;
    }
    if let Some(price) = changes.price {
        item.price = price;
    }

    db::items::update(db, user_id, &item).await
}

/// Deletes an item; its basket entries go with it.
///
/// # Errors
/// `ItemNotFound` when nothing was deleted.
pub async fn remove(db: &DatabaseConnection, user_id: Uuid, id: i64) -> Result<()> {
    db::items::delete(db, user_id, id).await
}
