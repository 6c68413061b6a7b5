//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod basket;
pub mod item;
pub mod user;

// Re-export specific types to avoid conflicts
pub use basket::{Column as BasketColumn, Entity as Basket, Model as BasketModel};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
