//! Item store: pantry persistence and the paginated search query.

use crate::{
    entities::{Item, item},
    errors::{Error, Result},
    models::{FIRST_PAGE, ItemOrder, Metadata, round_price},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet,
    Condition, FromQueryResult, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use tracing::{debug, info, instrument};

/// One page row plus the windowed count of all matching rows.
#[derive(Debug, FromQueryResult)]
struct ItemPageRow {
    total_records: i64,
    id: i64,
    user_id: Uuid,
    name: String,
    name_key: String,
    price: f64,
    times_bought: i32,
    created_at: DateTimeUtc,
    last_purchase_date: Option<DateTimeUtc>,
}

impl From<ItemPageRow> for item::Model {
    fn from(row: ItemPageRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            name_key: row.name_key,
            price: row.price,
            times_bought: row.times_bought,
            created_at: row.created_at,
            last_purchase_date: row.last_purchase_date,
        }
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Owner scope plus, for a non-empty query, a case-insensitive substring match.
fn listing_condition(user_id: Uuid, query: &str) -> Condition {
    let condition = Condition::all().add(item::Column::UserId.eq(user_id));
    if query.is_empty() {
        return condition;
    }
    let pattern = format!("%{}%", escape_like(&item::name_key(query)));
    condition.add(
        Expr::col((Item, item::Column::NameKey)).like(LikeExpr::new(pattern).escape('\\')),
    )
}

/// Row offset of `page`, capped at the largest offset the store accepts.
///
/// Any page that far out is past the end, so the cap never changes a result.
fn page_offset(page: u64, page_size: u64) -> u64 {
    const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();
    page.saturating_sub(1)
        .checked_mul(page_size)
        .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET))
}

fn checked_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice { price });
    }
    Ok(round_price(price))
}

/// Returns one page of the user's items and the metadata for the whole result.
///
/// `page` and `page_size` below 1 are raised to 1. The total comes from
/// `COUNT(*) OVER ()` on the same statement as the rows, so the two can never
/// disagree. A page past the end has no rows to carry the count, so it is
/// re-counted inside the same transaction.
#[instrument(skip(db))]
pub async fn search<C>(
    db: &C,
    user_id: Uuid,
    query: &str,
    page: u64,
    page_size: u64,
    order: ItemOrder,
) -> Result<(Metadata, Vec<item::Model>)>
where
    C: ConnectionTrait + TransactionTrait,
{
    let page = page.max(FIRST_PAGE);
    let page_size = page_size.max(1);
    let offset = page_offset(page, page_size);
    let txn = db.begin().await?;

    let rows = Item::find()
        .column_as(Expr::cust("COUNT(*) OVER ()"), "total_records")
        .filter(listing_condition(user_id, query))
        .order_by_desc(order.column())
        .order_by_desc(item::Column::Id)
        .limit(page_size)
        .offset(offset)
        .into_model::<ItemPageRow>()
        .all(&txn)
        .await?;

    let total_records = match rows.first() {
        Some(row) => u64::try_from(row.total_records).unwrap_or_default(),
        None if offset > 0 => {
            Item::find()
                .filter(listing_condition(user_id, query))
                .count(&txn)
                .await?
        }
        None => 0,
    };
    txn.commit().await?;

    let items: Vec<item::Model> = rows.into_iter().map(Into::into).collect();
    debug!(
        "Search '{}' page {} returned {} of {} items",
        query,
        page,
        items.len(),
        total_records
    );
    Ok((Metadata::calculate(total_records, page, page_size), items))
}

/// Finds one of the user's items by id.
#[instrument(skip(db))]
pub async fn get_by_id<C>(db: &C, user_id: Uuid, id: i64) -> Result<Option<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find_by_id(id)
        .filter(item::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the user's oldest item whose name equals `name`, ignoring case.
#[instrument(skip(db))]
pub async fn find_by_name<C>(db: &C, user_id: Uuid, name: &str) -> Result<Option<item::Model>>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(item::Column::UserId.eq(user_id))
        .filter(item::Column::NameKey.eq(item::name_key(name)))
        .order_by_asc(item::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a new item. The price is rounded to cents; negative prices are rejected.
#[instrument(skip(db))]
pub async fn create<C>(db: &C, user_id: Uuid, name: &str, price: f64) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    let price = checked_price(price)?;
    let item = item::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        name: Set(name.to_string()),
        name_key: Set(item::name_key(name)),
        price: Set(price),
        times_bought: Set(0),
        created_at: Set(Utc::now()),
        last_purchase_date: Set(None),
    }
    .insert(db)
    .await?;

    info!("Created item {} '{}' at ${:.2}", item.id, item.name, item.price);
    Ok(item)
}

/// Writes `item.name` and `item.price` back to the store.
///
/// # Errors
/// `ItemNotFound` when no row with that id belongs to the user.
#[instrument(skip(db))]
pub async fn update<C>(db: &C, user_id: Uuid, item: &item::Model) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    let price = checked_price(item.price)?;
    let result = Item::update_many()
        .col_expr(item::Column::Name, Expr::value(item.name.clone()))
        .col_expr(item::Column::NameKey, Expr::value(item::name_key(&item.name)))
        .col_expr(item::Column::Price, Expr::value(price))
        .filter(item::Column::Id.eq(item.id))
        .filter(item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ItemNotFound { id: item.id });
    }

    info!("Updated item {} to '{}' at ${:.2}", item.id, item.name, price);
    Ok(item::Model {
        name_key: item::name_key(&item.name),
        price,
        ..item.clone()
    })
}

/// Deletes one of the user's items. Basket entries for it cascade.
///
/// # Errors
/// `ItemNotFound` when nothing was deleted.
#[instrument(skip(db))]
pub async fn delete<C>(db: &C, user_id: Uuid, id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Item::delete_many()
        .filter(item::Column::Id.eq(id))
        .filter(item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ItemNotFound { id });
    }
    info!("Deleted item {}", id);
    Ok(())
}

/// Bumps `times_bought` and stamps `last_purchase_date` on the given items.
#[instrument(skip(db))]
pub async fn record_purchases<C>(
    db: &C,
    user_id: Uuid,
    item_ids: &[i64],
    purchased_at: DateTimeUtc,
) -> Result<u64>
where
    C: ConnectionTrait,
{
    if item_ids.is_empty() {
        return Ok(0);
    }

    let result = Item::update_many()
        .col_expr(
            item::Column::TimesBought,
            Expr::col(item::Column::TimesBought).add(1),
        )
        .col_expr(
            item::Column::LastPurchaseDate,
            Expr::value(Some(purchased_at)),
        )
        .filter(item::Column::UserId.eq(user_id))
        .filter(item::Column::Id.is_in(item_ids.iter().copied()))
        .exec(db)
        .await?;

    info!("Recorded purchase of {} items", result.rows_affected);
    Ok(result.rows_affected)
}
