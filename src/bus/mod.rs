//! Broadcast notification bus.
//!
//! Every committed order mutation is fanned out to all connected dashboard
//! clients as an [`OrderEvent`]. Events are a resync hint, not authoritative
//! state: subscribers re-query the store on receipt. Delivery is best-effort
//! only; publishing never blocks the mutating caller and never fails the
//! triggering operation.
//!
//! The subscriber registry is an explicit, injected object (no process-wide
//! singleton), so tests can subscribe and assert on the captured events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::model::{OrderId, OrderStatus};

/// A change notification. Carries just enough for a subscriber to decide to
/// re-fetch; the event body is never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// A new order was inserted.
    Created { order_id: OrderId },
    /// An order's status changed.
    Updated {
        order_id: OrderId,
        status: OrderStatus,
    },
}

/// Identifies one subscriber registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Subscriber {
    id: SubscriberId,
    sender: mpsc::UnboundedSender<OrderEvent>,
}

/// Fan-out registry of live subscribers.
///
/// The registry lock is short-held (add, remove, iterate) and is never held
/// across an await or a store call. Unbounded per-subscriber channels keep
/// `publish` non-blocking; a subscriber that went away is pruned on the next
/// publish.
#[derive(Clone, Default)]
pub struct NotificationBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. It receives events published from now on;
    /// there is no replay of past events.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("bus lock poisoned")
            .push(Subscriber { id, sender });
        debug!(subscriber_id = id.0, "Subscribed");
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Idempotent; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .expect("bus lock poisoned")
            .retain(|s| s.id != id);
        debug!(subscriber_id = id.0, "Unsubscribed");
    }

    /// Delivers `event` to every live subscriber. Never blocks, never fails.
    pub fn publish(&self, event: OrderEvent) {
        let mut subscribers = self.subscribers.lock().expect("bus lock poisoned");
        subscribers.retain(|s| s.sender.send(event.clone()).is_ok());
        debug!(?event, subscribers = subscribers.len(), "Published");
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("bus lock poisoned").len()
    }
}

/// One connected client's view of the bus.
///
/// Dropping the subscription disconnects it; the registry entry is pruned on
/// the next publish. Call [`NotificationBus::unsubscribe`] with [`Subscription::id`]
/// to remove it eagerly.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<OrderEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event. `None` once disconnected and drained.
    pub async fn recv(&mut self) -> Option<OrderEvent> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<OrderEvent> {
        self.receiver.try_recv().ok()
    }
}
