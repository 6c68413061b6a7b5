//! User entity - Registered accounts.
//!
//! `email` carries a unique constraint; a violation on insert is what the user
//! store classifies as a duplicate registration.

use sea_orm::entity::prelude::*;
use std::fmt;

/// User database model
#[derive(Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Generated at registration; stable session identity
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash of the password
    pub hashed_password: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

// Hand-written so the hash never reaches a log line.
impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many pantry items
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
    /// One user owns many basket entries
    #[sea_orm(has_many = "super::basket::Entity")]
    Basket,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::basket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Basket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
