//! Basket business logic - the shopping list built from pantry items.

use crate::{
    core::item::parse_item_input,
    db,
    entities::item,
    errors::{Error, Result},
    models::{Basket, BasketItem},
    validator::{Validator, validate_name},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait, prelude::Uuid};
use tracing::{debug, info, instrument};

/// The user's basket with its derived total.
#[instrument(skip(db))]
pub async fn get_items(db: &DatabaseConnection, user_id: Uuid) -> Result<Basket> {
    let basket = Basket::new(db::basket::get_all(db, user_id).await?);
    debug!(
        "Basket has {} entries totalling {} cents",
        basket.len(),
        basket.total_cents()
    );
    Ok(basket)
}

/// One basket entry.
///
/// # Errors
/// `BasketItemNotFound` if it does not exist or belongs to someone else.
pub async fn get_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    basket_id: i64,
) -> Result<BasketItem> {
    db::basket::get(db, user_id, basket_id)
        .await?
        .ok_or(Error::BasketItemNotFound { id: basket_id })
}

/// Puts one of the user's pantry items in the basket.
///
/// # Errors
/// `ItemNotFound` if the item is missing or foreign.
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    item_id: i64,
) -> Result<BasketItem> {
    let txn = db.begin().await?;

    let item = db::items::get_by_id(&txn, user_id, item_id)
        .await?
        .ok_or(Error::ItemNotFound { id: item_id })?;
    let entry = db::basket::add(&txn, user_id, item.id).await?;

    txn.commit().await?;
    Ok(BasketItem {
        basket_id: entry.id,
        purchased: entry.purchased,
        item,
    })
}

/// Flips the purchased flag and returns the entry as it now stands.
///
/// Calling it twice restores the original state.
///
/// # Errors
/// `BasketItemNotFound` if the entry is missing or foreign.
#[instrument(skip(db))]
pub async fn toggle_purchased(
    db: &DatabaseConnection,
    user_id: Uuid,
    basket_id: i64,
) -> Result<BasketItem> {
    let txn = db.begin().await?;

    db::basket::toggle_purchased(&txn, user_id, basket_id).await?;
    let entry = db::basket::get(&txn, user_id, basket_id)
        .await?
        .ok_or(Error::BasketItemNotFound { id: basket_id })?;

    txn.commit().await?;
    Ok(entry)
}

/// Removes one entry from the basket. The pantry item stays.
pub async fn remove_item(db: &DatabaseConnection, user_id: Uuid, basket_id: i64) -> Result<()> {
    db::basket::remove(db, user_id, basket_id).await
}

/// Empties the basket. Clearing an empty basket is fine and returns 0.
pub async fn remove_all(db: &DatabaseConnection, user_id: Uuid) -> Result<u64> {
    db::basket::remove_all(db, user_id).await
}

/// Quick-add: parses `"<name> $<price>"`, reuses a pantry item with the same
/// name (ignoring case) or creates one, then adds it to the basket.
///
/// A reused item takes the parsed price only when one was given.
///
/// # Errors
/// `Validation` if the parsed name is empty or too long.
#[instrument(skip(db))]
pub async fn add_new_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    raw: &str,
) -> Result<BasketItem> {
    let (name, price) = parse_item_input(raw);
    let mut v = Validator::new();
    validate_name(&mut v, &name);
    v.into_result()?;

    let txn = db.begin().await?;

    let item = match db::items::find_by_name(&txn, user_id, &name).await? {
        Some(existing) => reuse_item(&txn, user_id, existing, price).await?,
        None => db::items::create(&txn, user_id, &name, price).await?,
    };
    let entry = db::basket::add(&txn, user_id, item.id).await?;

    txn.commit().await?;
    Ok(BasketItem {
        basket_id: entry.id,
        purchased: entry.purchased,
        item,
    })
}

async fn reuse_item<C>(
    db: &C,
    user_id: Uuid,
    mut existing: item::Model,
    price: f64,
) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    // A zero price means none was typed
    if price > 0.0 && (price - existing.price).abs() >= 0.005 {
        existing.price = price;
        return db::items::update(db, user_id, &existing).await;
    }
    debug!("Reusing pantry item {} '{}'", existing.id, existing.name);
    Ok(existing)
}

/// Records every purchased entry against its item, then clears the basket.
///
/// Returns how many items were recorded as bought. Runs in one transaction.
#[instrument(skip(db))]
pub async fn checkout(db: &DatabaseConnection, user_id: Uuid) -> Result<u64> {
    let txn = db.begin().await?;

    let purchased = db::basket::purchased_item_ids(&txn, user_id).await?;
    let recorded = db::items::record_purchases(&txn, user_id, &purchased, Utc::now()).await?;
    let cleared = db::basket::remove_all(&txn, user_id).await?;

    txn.commit().await?;
    info!(
        "Checked out {} purchased items, cleared {} entries",
        recorded, cleared
    );
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{models::to_cents, test_utils::*};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_basket_total_matches_sum_of_prices() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let prices = [0.1, 0.2, 3.5, 19.99];
        for (n, price) in prices.iter().enumerate() {
            let item = create_custom_item(&db, user.id, &format!("Item {n}"), *price, 0).await?;
            add_item(&db, user.id, item.id).await?;
        }

        let basket = get_items(&db, user.id).await?;
        assert_eq!(basket.len(), 4);
        let expected: i64 = prices.iter().map(|p| to_cents(*p)).sum();
        assert_eq!(basket.total_cents(), expected);
        assert_eq!(basket.total(), 23.79);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_basket() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let basket = get_items(&db, user.id).await?;
        assert!(basket.is_empty());
        assert_eq!(basket.total(), 0.0);
        assert_eq!(remove_all(&db, user.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_requires_ownership() -> Result<()> {
        let (db, alice) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        let milk = create_test_item(&db, alice.id, "Milk").await?;

        let result = add_item(&db, bob.id, milk.id).await;
        assert!(matches!(result, Err(Error::ItemNotFound { .. })));
        assert!(get_items(&db, bob.id).await?.is_empty());

        let result = add_item(&db, alice.id, 999).await;
        assert!(matches!(result, Err(Error::ItemNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let entry = add_item(&db, user.id, milk.id).await?;
        assert!(!entry.purchased);

        let toggled = toggle_purchased(&db, user.id, entry.basket_id).await?;
        assert!(toggled.purchased);
        assert_eq!(toggled.item, milk);

        let restored = toggle_purchased(&db, user.id, entry.basket_id).await?;
        assert!(!restored.purchased);
        assert_eq!(get_item(&db, user.id, entry.basket_id).await?, restored);
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_entries_are_not_found() -> Result<()> {
        let (db, alice) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        let milk = create_test_item(&db, alice.id, "Milk").await?;
        let entry = add_item(&db, alice.id, milk.id).await?;

        let result = toggle_purchased(&db, bob.id, entry.basket_id).await;
        assert!(matches!(result, Err(Error::BasketItemNotFound { .. })));
        let result = remove_item(&db, bob.id, entry.basket_id).await;
        assert!(matches!(result, Err(Error::BasketItemNotFound { .. })));
        let result = get_item(&db, bob.id, entry.basket_id).await;
        assert!(result.unwrap_err().is_not_found());

        // Alice's entry is untouched
        assert!(!get_item(&db, alice.id, entry.basket_id).await?.purchased);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_item_keeps_pantry_item() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let entry = add_item(&db, user.id, milk.id).await?;

        remove_item(&db, user.id, entry.basket_id).await?;
        assert!(get_items(&db, user.id).await?.is_empty());
        assert!(db::items::get_by_id(&db, user.id, milk.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_new_item_creates_then_reuses() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let first = add_new_item(&db, user.id, "Milk $3.50").await?;
        assert_eq!(first.item.name, "Milk");
        assert_eq!(first.item.price, 3.5);

        // Same name, no price: reuses the item and keeps its price
        let second = add_new_item(&db, user.id, "milk").await?;
        assert_eq!(second.item.id, first.item.id);
        assert_eq!(second.item.price, 3.5);
        assert_ne!(second.basket_id, first.basket_id);

        // Same name with a price: reuses and reprices
        let third = add_new_item(&db, user.id, "MILK $4").await?;
        assert_eq!(third.item.id, first.item.id);
        assert_eq!(third.item.price, 4.0);

        let basket = get_items(&db, user.id).await?;
        assert_eq!(basket.len(), 3);
        assert!(basket.items.iter().all(|e| e.item.price == 4.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_new_item_reuses_non_ascii_names() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let first = add_new_item(&db, user.id, "JALAPEÑO $1.20").await?;
        let second = add_new_item(&db, user.id, "jalapeño").await?;

        assert_eq!(second.item.id, first.item.id);
        assert_eq!(second.item.name, "JALAPEÑO");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_new_item_rejects_empty_name() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = add_new_item(&db, Uuid::nil(), " $3.50").await;
        let Err(Error::Validation(v)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(v.get_error("name"), Some("Name cannot be empty"));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_records_purchases_and_clears() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let eggs = create_test_item(&db, user.id, "Eggs").await?;

        let bought = add_item(&db, user.id, milk.id).await?;
        add_item(&db, user.id, eggs.id).await?;
        toggle_purchased(&db, user.id, bought.basket_id).await?;

        assert_eq!(checkout(&db, user.id).await?, 1);
        assert!(get_items(&db, user.id).await?.is_empty());

        let milk = db::items::get_by_id(&db, user.id, milk.id).await?.unwrap();
        assert_eq!(milk.times_bought, 1);
        assert!(milk.last_purchase_date.is_some());
        let eggs = db::items::get_by_id(&db, user.id, eggs.id).await?.unwrap();
        assert_eq!(eggs.times_bought, 0);
        assert!(eggs.last_purchase_date.is_none());

        // Nothing left to check out
        assert_eq!(checkout(&db, user.id).await?, 0);
        Ok(())
    }
}
