use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication required: {message}")]
    Unauthenticated { message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("User {id} not found")]
    UserNotFound { id: i64 },

    #[error("Category {id} not found")]
    CategoryNotFound { id: i64 },

    #[error("Product {id} not found")]
    ProductNotFound { id: i64 },

    #[error("No cart exists for user {user_id}")]
    CartNotFound { user_id: i64 },

    #[error("Product {product_id} is not in the cart")]
    ProductNotInCart { product_id: i64 },

    #[error("Invoice {id} not found")]
    InvoiceNotFound { id: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("The cart has no products to invoice")]
    EmptyCart,

    #[error("Product {id} is unavailable or out of stock")]
    ProductUnavailable { id: i64 },

    #[error("Insufficient stock for product {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Password hashing error: {message}")]
    PasswordHash { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Storage error: {0}")]
    Store(#[from] sea_orm::DbErr),
}

/// Coarse failure categories an outer surface maps onto response codes.
///
/// Business-rule violations keep a stable category and message; storage and
/// configuration faults collapse into [`FaultKind::Internal`] so internals
/// never leak to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Missing or unverifiable credential
    Unauthenticated,
    /// Role or ownership mismatch
    Forbidden,
    /// Referenced entity does not exist
    NotFound,
    /// Malformed input or business-rule violation
    Invalid,
    /// Unexpected storage or configuration fault
    Internal,
}

impl Error {
    /// Classifies this error for the outer surface.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::Unauthenticated { .. } | Self::InvalidToken { .. } => FaultKind::Unauthenticated,
            Self::Forbidden { .. } => FaultKind::Forbidden,
            Self::UserNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::CartNotFound { .. }
            | Self::ProductNotInCart { .. }
            | Self::InvoiceNotFound { .. } => FaultKind::NotFound,
            Self::Validation { .. }
            | Self::EmptyCart
            | Self::ProductUnavailable { .. }
            | Self::InsufficientStock { .. } => FaultKind::Invalid,
            Self::PasswordHash { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Store(_) => FaultKind::Internal,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
