//! In-memory order store, actor style.
//!
//! The table is owned by a single Tokio task ([`StoreActor`]) that processes
//! requests sequentially off an `mpsc` channel. Sequential processing is what
//! makes [`OrderStore::update_status_if_current`] a genuine single-row
//! compare-and-swap: no two mutations ever interleave, so a caller whose
//! expected status went stale loses cleanly instead of overwriting.
//!
//! Callers hold a [`StoreHandle`], a cheap clone that sends typed requests
//! carrying `oneshot` response channels and enforces a per-call deadline.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::model::{NewOrder, Order, OrderId, OrderStatus, UserId};
use crate::store::{OrderStore, StoreError};

/// Default per-call deadline for store requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// REQUESTS
// =============================================================================

/// One response channel per request; the actor never fails internally, so the
/// payload is the bare result.
type Response<T> = oneshot::Sender<T>;

#[derive(Debug)]
enum StoreRequest {
    Insert {
        order: NewOrder,
        respond_to: Response<Order>,
    },
    FindById {
        id: OrderId,
        respond_to: Response<Option<Order>>,
    },
    UpdateStatusIfCurrent {
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
        respond_to: Response<Option<Order>>,
    },
    QueryByOwner {
        owner: UserId,
        respond_to: Response<Vec<Order>>,
    },
    QueryAll {
        status: Option<OrderStatus>,
        respond_to: Response<Vec<Order>>,
    },
}

// =============================================================================
// THE ACTOR
// =============================================================================

/// Owns the order table and the auto-increment counter.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    orders: BTreeMap<OrderId, Order>,
    next_id: u64,
}

impl StoreActor {
    /// Creates the actor and its handle. Spawn the actor with
    /// `tokio::spawn(actor.run())`; drop every handle clone to stop it.
    pub fn new() -> (Self, StoreHandle) {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Like [`StoreActor::new`] with an explicit per-call deadline.
    pub fn with_timeout(call_timeout: Duration) -> (Self, StoreHandle) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let actor = Self {
            receiver,
            orders: BTreeMap::new(),
            next_id: 1,
        };
        let handle = StoreHandle {
            sender,
            call_timeout,
        };
        (actor, handle)
    }

    /// Runs the request loop until every handle is dropped.
    pub async fn run(mut self) {
        info!("Order store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { order, respond_to } => {
                    let id = OrderId(self.next_id);
                    self.next_id += 1;
                    let row = Order {
                        id,
                        owner: order.owner,
                        description: order.description,
                        zone: order.zone,
                        estimated_time: order.estimated_time,
                        instructions: order.instructions,
                        status: OrderStatus::Pending,
                        created_at: order.created_at,
                    };
                    self.orders.insert(id, row.clone());
                    info!(order_id = %id, size = self.orders.len(), "Inserted");
                    let _ = respond_to.send(row);
                }
                StoreRequest::FindById { id, respond_to } => {
                    let row = self.orders.get(&id).cloned();
                    debug!(order_id = %id, found = row.is_some(), "FindById");
                    let _ = respond_to.send(row);
                }
                StoreRequest::UpdateStatusIfCurrent {
                    id,
                    expected,
                    new,
                    respond_to,
                } => {
                    let updated = match self.orders.get_mut(&id) {
                        Some(row) if row.status == expected => {
                            row.status = new;
                            info!(order_id = %id, status = %new, "Status updated");
                            Some(row.clone())
                        }
                        Some(row) => {
                            warn!(
                                order_id = %id,
                                expected = %expected,
                                actual = %row.status,
                                "Stale status update rejected"
                            );
                            None
                        }
                        None => {
                            warn!(order_id = %id, "Status update for unknown order");
                            None
                        }
                    };
                    let _ = respond_to.send(updated);
                }
                StoreRequest::QueryByOwner { owner, respond_to } => {
                    let rows = self.select(|row| row.owner == owner);
                    debug!(owner = %owner, count = rows.len(), "QueryByOwner");
                    let _ = respond_to.send(rows);
                }
                StoreRequest::QueryAll { status, respond_to } => {
                    let rows = self.select(|row| status.is_none_or(|s| row.status == s));
                    debug!(count = rows.len(), "QueryAll");
                    let _ = respond_to.send(rows);
                }
            }
        }

        info!(size = self.orders.len(), "Order store shut down");
    }

    /// Matching rows, newest `created_at` first, id as tie-break.
    fn select(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut rows: Vec<Order> = self.orders.values().filter(|r| keep(r)).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }
}

// =============================================================================
// THE HANDLE
// =============================================================================

/// Cheap, cloneable front for the store actor. Implements [`OrderStore`].
#[derive(Clone)]
pub struct StoreHandle {
    sender: mpsc::Sender<StoreRequest>,
    call_timeout: Duration,
}

impl StoreHandle {
    async fn request<T>(
        &self,
        req: StoreRequest,
        response: oneshot::Receiver<T>,
    ) -> Result<T, StoreError> {
        self.sender.send(req).await.map_err(|_| StoreError::Closed)?;
        match timeout(self.call_timeout, response).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(StoreError::Dropped),
            Err(_) => Err(StoreError::Timeout(self.call_timeout)),
        }
    }
}

#[async_trait]
impl OrderStore for StoreHandle {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.request(StoreRequest::Insert { order, respond_to }, response)
            .await
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.request(StoreRequest::FindById { id, respond_to }, response)
            .await
    }

    async fn update_status_if_current(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.request(
            StoreRequest::UpdateStatusIfCurrent {
                id,
                expected,
                new,
                respond_to,
            },
            response,
        )
        .await
    }

    async fn query_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.request(
            StoreRequest::QueryByOwner {
                owner: owner.clone(),
                respond_to,
            },
            response,
        )
        .await
    }

    async fn query_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.request(StoreRequest::QueryAll { status, respond_to }, response)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn new_order(owner: &str, minute: u32) -> NewOrder {
        NewOrder {
            owner: UserId::from(owner),
            description: "K50 for 2L Milk".to_string(),
            zone: crate::model::DeliveryZone::Campus,
            estimated_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            instructions: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
        }
    }

    fn spawn_store() -> StoreHandle {
        let (actor, handle) = StoreActor::new();
        tokio::spawn(actor.run());
        handle
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_pending_status() {
        let store = spawn_store();

        let first = store.insert(new_order("alice", 0)).await.unwrap();
        let second = store.insert(new_order("alice", 1)).await.unwrap();

        assert_eq!(first.id, OrderId(1));
        assert_eq!(second.id, OrderId(2));
        assert_eq!(first.status, OrderStatus::Pending);
        assert_eq!(first.owner, UserId::from("alice"));
    }

    #[tokio::test]
    async fn find_by_id_roundtrip() {
        let store = spawn_store();
        let inserted = store.insert(new_order("alice", 0)).await.unwrap();

        let found = store.find_by_id(inserted.id).await.unwrap();
        assert_eq!(found, Some(inserted));

        let missing = store.find_by_id(OrderId(99)).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn compare_and_swap_rejects_stale_expected_status() {
        let store = spawn_store();
        let order = store.insert(new_order("alice", 0)).await.unwrap();

        let updated = store
            .update_status_if_current(order.id, OrderStatus::Pending, OrderStatus::InProgress)
            .await
            .unwrap()
            .expect("first update should win");
        assert_eq!(updated.status, OrderStatus::InProgress);

        // Same expectation again: the stored status moved on.
        let stale = store
            .update_status_if_current(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(stale, None);

        // Unknown row behaves like a failed compare.
        let missing = store
            .update_status_if_current(OrderId(99), OrderStatus::Pending, OrderStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn queries_filter_and_sort_newest_first() {
        let store = spawn_store();
        let a1 = store.insert(new_order("alice", 0)).await.unwrap();
        let b1 = store.insert(new_order("bob", 5)).await.unwrap();
        let a2 = store.insert(new_order("alice", 10)).await.unwrap();

        let alices = store.query_by_owner(&UserId::from("alice")).await.unwrap();
        assert_eq!(
            alices.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![a2.id, a1.id]
        );
        assert!(alices.iter().all(|o| o.owner == UserId::from("alice")));

        let all = store.query_all(None).await.unwrap();
        assert_eq!(
            all.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![a2.id, b1.id, a1.id]
        );

        store
            .update_status_if_current(b1.id, OrderStatus::Pending, OrderStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        let pending = store.query_all(Some(OrderStatus::Pending)).await.unwrap();
        assert_eq!(
            pending.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![a2.id, a1.id]
        );
    }

    #[tokio::test]
    async fn unresponsive_store_times_out() {
        // Actor created but never spawned: the request is buffered and the
        // response never arrives.
        let (_actor, handle) = StoreActor::with_timeout(Duration::from_millis(20));

        let err = handle.find_by_id(OrderId(1)).await.unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn closed_store_surfaces_as_unavailable() {
        let (actor, handle) = StoreActor::new();
        drop(actor);

        let err = handle.find_by_id(OrderId(1)).await.unwrap_err();
        assert_eq!(err, StoreError::Closed);
    }
}
