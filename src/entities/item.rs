//! Item entity - A pantry item with its price and purchase history.
//!
//! Every row belongs to exactly one user. `times_bought` and
//! `last_purchase_date` are only advanced by basket checkout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Item name (e.g., "Milk")
    pub name: String,
    /// `name` with full Unicode lowercasing; searches and name lookups match on this
    #[serde(skip)]
    pub name_key: String,
    /// Price in dollars, always rounded to cents before it is written
    pub price: f64,
    /// How many checkouts included this item
    pub times_bought: i32,
    /// When the item was added to the pantry
    pub created_at: DateTimeUtc,
    /// Most recent checkout that included this item
    pub last_purchase_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// An item can sit in the basket
    #[sea_orm(has_many = "super::basket::Entity")]
    Basket,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::basket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Basket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Folds an item name into the form stored in `name_key`.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}
