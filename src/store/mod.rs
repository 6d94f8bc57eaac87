//! Order store seam.
//!
//! The durable order table is consumed through the [`OrderStore`] trait:
//! five operations, one mutation path each, queries sorted newest-first.
//! [`memory`] provides the actor-backed in-memory implementation; a SQL
//! deployment would implement the same trait over a single-row transaction.

pub mod memory;

pub use memory::{StoreActor, StoreHandle};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::model::{NewOrder, Order, OrderId, OrderStatus, UserId};

/// Infrastructure failures while talking to the store.
///
/// All variants are transient from the caller's point of view; the lifecycle
/// service surfaces them as `StoreUnavailable`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store task is gone; the request channel is closed.
    #[error("store closed")]
    Closed,

    /// The store dropped the response channel mid-request.
    #[error("store dropped response channel")]
    Dropped,

    /// No response within the per-call deadline.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Durable table of orders.
///
/// The store is dumb on purpose. It assigns ids and stamps the initial
/// status; the compare-and-swap is the only conditional it knows. Every
/// business rule lives in the lifecycle service.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a validated order, assigning the next id and stamping
    /// `Pending`. Returns the stored row.
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetches one order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Sets `status = new` only if the stored status still equals `expected`.
    ///
    /// Returns the updated row, or `None` when the compare failed (row
    /// missing or status changed since it was read).
    async fn update_status_if_current(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    /// All orders owned by `owner`, newest `created_at` first.
    async fn query_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StoreError>;

    /// All orders, optionally restricted to one status, newest first.
    async fn query_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;
}
