//! Service layer - framework-agnostic operations callers invoke per request.
//!
//! Services translate repository results into request-facing results: they parse
//! free-text input, apply partial updates, hash passwords and classify
//! "not found" conditions. Every function takes the caller's user id explicitly.

/// Basket aggregation, purchase toggling and checkout
pub mod basket;
/// Pantry search, suggestions and item mutation
pub mod item;
/// Registration, login and account lookup
pub mod user;
