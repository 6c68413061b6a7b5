//! Plain data handed back to callers. Nothing here touches the store.

use crate::entities::{item, user};
use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

/// The lowest valid page index.
pub const FIRST_PAGE: u64 = 1;

/// Pagination descriptor for an item listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Page that was returned
    pub current_page: u64,
    /// Rows per page after clamping
    pub page_size: u64,
    /// Always [`FIRST_PAGE`]
    pub first_page: u64,
    /// `ceil(total_records / page_size)`
    pub last_page: u64,
    /// Rows matching the filter before pagination
    pub total_records: u64,
}

impl Metadata {
    /// Builds the descriptor. A `page_size` of 0 is treated as 1.
    #[must_use]
    pub const fn calculate(total_records: u64, page: u64, page_size: u64) -> Self {
        let page_size = if page_size == 0 { 1 } else { page_size };
        Self {
            current_page: page,
            page_size,
            first_page: FIRST_PAGE,
            last_page: total_records.div_ceil(page_size),
            total_records,
        }
    }

    /// Whether a page after this one exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Whether a page before this one exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > self.first_page
    }
}

/// Sort key for item listings. Ordering is always descending, ties broken by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOrder {
    /// Most recently checked out first
    RecentlyPurchased,
    /// Newest pantry items first
    RecentlyAdded,
    /// Most frequently bought first
    #[default]
    TimesBought,
}

impl ItemOrder {
    /// Column the listing is sorted on.
    #[must_use]
    pub const fn column(self) -> item::Column {
        match self {
            Self::RecentlyPurchased => item::Column::LastPurchaseDate,
            Self::RecentlyAdded => item::Column::CreatedAt,
            Self::TimesBought => item::Column::TimesBought,
        }
    }

    /// Name used by forms and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecentlyPurchased => "recentlyPurchased",
            Self::RecentlyAdded => "recentlyAdded",
            Self::TimesBought => "timesBought",
        }
    }
}

/// Unrecognised names fall back to [`ItemOrder::TimesBought`].
impl From<&str> for ItemOrder {
    fn from(value: &str) -> Self {
        match value {
            "recentlyPurchased" => Self::RecentlyPurchased,
            "recentlyAdded" => Self::RecentlyAdded,
            _ => Self::TimesBought,
        }
    }
}

/// A basket entry joined with its item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketItem {
    /// Basket entry id
    pub basket_id: i64,
    /// Ticked off while shopping
    pub purchased: bool,
    /// The referenced pantry item
    pub item: item::Model,
}

/// The user's shopping list. The total is derived on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Entries in basket order
    pub items: Vec<BasketItem>,
    total_cents: i64,
}

impl Basket {
    /// Builds a basket and sums its prices in whole cents.
    #[must_use]
    pub fn new(items: Vec<BasketItem>) -> Self {
        let total_cents = items.iter().map(|entry| to_cents(entry.item.price)).sum();
        Self { items, total_cents }
    }

    /// Sum of all item prices, in cents.
    #[must_use]
    pub const fn total_cents(&self) -> i64 {
        self.total_cents
    }

    /// Sum of all item prices, in dollars.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total(&self) -> f64 {
        self.total_cents as f64 / 100.0
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the basket has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Converts a dollar amount to whole cents.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Rounds a dollar amount to 2 decimal places.
#[must_use]
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Fields to change on an item. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    /// New name
    pub name: Option<String>,
    /// New price in dollars
    pub price: Option<f64>,
}

impl ItemChanges {
    /// Maps raw edit-form values: an empty name or a zero price means "unchanged".
    #[must_use]
    pub fn from_form(name: &str, price: f64) -> Self {
        Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            price: (price != 0.0).then_some(price),
        }
    }

    /// Whether nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }
}

/// A verified account as seen outside the store. Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Session identity
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}
