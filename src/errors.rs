//! Unified error type for the pantry and basket core.
//!
//! Store failures bubble up unchanged as [`Error::Database`]; the service layer
//! classifies the conditions callers care about (missing rows, duplicate emails,
//! bad credentials) into their own variants and leaves everything else opaque.

use crate::validator::Validator;
use thiserror::Error;

/// Errors produced by the repository and service layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Bootstrap configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Opaque store failure (connection, query, unclassified constraint)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure while bootstrapping
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Item missing or owned by another user
    #[error("Item not found: {id}")]
    ItemNotFound {
        /// Requested item id
        id: i64,
    },

    /// Basket entry missing or owned by another user
    #[error("Basket item not found: {id}")]
    BasketItemNotFound {
        /// Requested basket entry id
        id: i64,
    },

    /// No user with the given identifier
    #[error("User not found")]
    UserNotFound,

    /// Registration hit the unique email constraint
    #[error("Email address already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// One or more fields failed validation
    #[error("{0}")]
    Validation(Validator),

    /// Price is negative or not a finite number
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A blocking hashing task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// True for the "row missing or not yours" family.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound { .. } | Self::BasketItemNotFound { .. } | Self::UserNotFound
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
