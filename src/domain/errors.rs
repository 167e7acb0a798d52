use std::sync::PoisonError;

use thiserror::Error;

/// Failures raised by the order service and its repositories.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("The restaurant is not accepting orders right now")]
    OrdersPaused,
    #[error("Order is already delivered")]
    AlreadyDelivered,
    #[error("Order status changed concurrently: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal error: {0}")]
    Internal(String),
}

// Shared in-memory state (order store, admin sessions) sits behind mutexes.
impl<T> From<PoisonError<T>> for DomainError {
    fn from(e: PoisonError<T>) -> Self {
        DomainError::Internal(format!("lock poisoned: {e}"))
    }
}

/// Failures talking to the ordering API from the client side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error(
        "request rejected ({status}): {}",
        message.as_deref().unwrap_or("no details")
    )]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
