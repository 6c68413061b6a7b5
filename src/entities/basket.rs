//! Basket entity - An item placed on the shopping list.
//!
//! Rows reference `items` with `ON DELETE CASCADE`, so deleting a pantry item
//! also drops it from the basket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Basket entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "basket")]
pub struct Model {
    /// Basket entry identifier (distinct from the item id)
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// The pantry item this entry refers to
    pub item_id: i64,
    /// Ticked off while shopping
    pub purchased: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry points at one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
    /// Each entry belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
