//! Basket store: entries joined with their items.

use crate::{
    entities::{Basket, Item, basket, item},
    errors::{Error, Result},
    models::BasketItem,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

fn join_entry(entry: basket::Model, item: Option<item::Model>) -> Option<BasketItem> {
    match item {
        Some(item) => Some(BasketItem {
            basket_id: entry.id,
            purchased: entry.purchased,
            item,
        }),
        None => {
            warn!(
                "Basket entry {} references missing item {}, skipping",
                entry.id, entry.item_id
            );
            None
        }
    }
}

/// All of the user's basket entries with their items, in insertion order.
///
/// Entries whose item no longer exists are left out.
#[instrument(skip(db))]
pub async fn get_all<C>(db: &C, user_id: Uuid) -> Result<Vec<BasketItem>>
where
    C: ConnectionTrait,
{
    let rows = Basket::find()
        .filter(basket::Column::UserId.eq(user_id))
        .order_by_asc(basket::Column::Id)
        .find_also_related(Item)
        .all(db)
        .await?;

    let entries: Vec<BasketItem> = rows
        .into_iter()
        .filter_map(|(entry, item)| join_entry(entry, item))
        .collect();
    debug!("Fetched {} basket entries", entries.len());
    Ok(entries)
}

/// One basket entry with its item, if it exists and belongs to the user.
#[instrument(skip(db))]
pub async fn get<C>(db: &C, user_id: Uuid, basket_id: i64) -> Result<Option<BasketItem>>
where
    C: ConnectionTrait,
{
    let row = Basket::find_by_id(basket_id)
        .filter(basket::Column::UserId.eq(user_id))
        .find_also_related(Item)
        .one(db)
        .await?;

    Ok(row.and_then(|(entry, item)| join_entry(entry, item)))
}

/// Puts an item in the basket, unpurchased.
#[instrument(skip(db))]
pub async fn add<C>(db: &C, user_id: Uuid, item_id: i64) -> Result<basket::Model>
where
    C: ConnectionTrait,
{
    let entry = basket::ActiveModel {
        user_id: Set(user_id),
        item_id: Set(item_id),
        purchased: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Added item {} to basket as entry {}", item_id, entry.id);
    Ok(entry)
}

/// Flips `purchased` in a single statement.
///
/// # Errors
/// `BasketItemNotFound` when no row with that id belongs to the user.
#[instrument(skip(db))]
pub async fn toggle_purchased<C>(db: &C, user_id: Uuid, basket_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Basket::update_many()
        .col_expr(
            basket::Column::Purchased,
            Expr::col(basket::Column::Purchased).not(),
        )
        .filter(basket::Column::Id.eq(basket_id))
        .filter(basket::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BasketItemNotFound { id: basket_id });
    }
    info!("Toggled purchased on basket entry {}", basket_id);
    Ok(())
}

/// Removes one entry.
///
/// # Errors
/// `BasketItemNotFound` when nothing was deleted.
#[instrument(skip(db))]
pub async fn remove<C>(db: &C, user_id: Uuid, basket_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Basket::delete_many()
        .filter(basket::Column::Id.eq(basket_id))
        .filter(basket::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BasketItemNotFound { id: basket_id });
    }
    info!("Removed basket entry {}", basket_id);
    Ok(())
}

/// Empties the user's basket and returns how many entries were removed.
#[instrument(skip(db))]
pub async fn remove_all<C>(db: &C, user_id: Uuid) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Basket::delete_many()
        .filter(basket::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    info!("Cleared {} basket entries", result.rows_affected);
    Ok(result.rows_affected)
}

/// Item ids of every entry currently ticked off.
#[instrument(skip(db))]
pub async fn purchased_item_ids<C>(db: &C, user_id: Uuid) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Basket::find()
        .select_only()
        .column(basket::Column::ItemId)
        .filter(basket::Column::UserId.eq(user_id))
        .filter(basket::Column::Purchased.eq(true))
        .order_by_asc(basket::Column::Id)
        .into_tuple::<i64>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_and_get_all() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let eggs = create_test_item(&db, user.id, "Eggs").await?;

        let first = add(&db, user.id, milk.id).await?;
        let second = add(&db, user.id, eggs.id).await?;
        assert!(!first.purchased);

        let entries = get_all(&db, user.id).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].basket_id, first.id);
        assert_eq!(entries[0].item, milk);
        assert_eq!(entries[1].basket_id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_is_owner_scoped() -> Result<()> {
        let (db, alice) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        let milk = create_test_item(&db, alice.id, "Milk").await?;
        let entry = add(&db, alice.id, milk.id).await?;

        assert!(get(&db, alice.id, entry.id).await?.is_some());
        assert!(get(&db, bob.id, entry.id).await?.is_none());
        assert!(get_all(&db, bob.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_purchased_flips() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let entry = add(&db, user.id, milk.id).await?;

        toggle_purchased(&db, user.id, entry.id).await?;
        assert!(get(&db, user.id, entry.id).await?.unwrap().purchased);
        assert_eq!(purchased_item_ids(&db, user.id).await?, vec![milk.id]);

        toggle_purchased(&db, user.id, entry.id).await?;
        assert!(!get(&db, user.id, entry.id).await?.unwrap().purchased);
        assert!(purchased_item_ids(&db, user.id).await?.is_empty());

        let result = toggle_purchased(&db, user.id, 999).await;
        assert!(matches!(result, Err(Error::BasketItemNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_and_remove_all() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let entry = add(&db, user.id, milk.id).await?;
        add(&db, user.id, milk.id).await?;

        remove(&db, user.id, entry.id).await?;
        let result = remove(&db, user.id, entry.id).await;
        assert!(matches!(result, Err(Error::BasketItemNotFound { .. })));

        assert_eq!(remove_all(&db, user.id).await?, 1);
        assert_eq!(remove_all(&db, user.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_item_cascades_to_basket() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let milk = create_test_item(&db, user.id, "Milk").await?;
        let entry = add(&db, user.id, milk.id).await?;

        crate::db::items::delete(&db, user.id, milk.id).await?;

        assert!(get_all(&db, user.id).await?.is_empty());
        assert!(Basket::find_by_id(entry.id).one(&db).await?.is_none());
        Ok(())
    }
}
