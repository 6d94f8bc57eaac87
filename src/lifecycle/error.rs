//! Error type for the order lifecycle service.

use thiserror::Error;

use crate::model::{OrderId, OrderStatus, ValidationError};
use crate::store::StoreError;

/// Everything an order operation can fail with.
///
/// One enum for the whole service: callers pattern-match a single type
/// instead of juggling per-operation errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The submitted draft was malformed. Recoverable; re-prompt the user.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The caller is unknown or lacks the role this operation requires.
    /// Not retryable with the same credentials.
    #[error("not authorized: {0}")]
    Auth(String),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The requested status change is not legal from the current state:
    /// an illegal pair, a terminal state, or a lost race against a
    /// concurrent update. Re-fetch the order before retrying.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Transient infrastructure failure. Safe to retry with backoff.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        OrderError::StoreUnavailable(e.to_string())
    }
}
