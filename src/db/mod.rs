//! Repository layer. Every query is scoped to the calling user's id; no
//! function here reads identity from anywhere but its arguments.

pub mod basket;
pub mod items;
pub mod users;
