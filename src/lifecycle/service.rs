//! The order lifecycle service: the sole writer of order state.
//!
//! Every operation resolves the caller through the identity provider,
//! enforces the authorization and transition rules, performs at most one
//! store mutation, and publishes a notification only after the mutation
//! committed. Authorization failures are reported before transition-legality
//! failures so unauthorized callers learn nothing about order state.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::bus::{NotificationBus, OrderEvent};
use crate::clock::Clock;
use crate::identity::{Identity, IdentityError, IdentityProvider};
use crate::lifecycle::error::OrderError;
use crate::model::{Order, OrderDraft, OrderId, OrderStatus, UserId};
use crate::store::OrderStore;

/// Composes identity, store, bus and clock. Cheap to clone; one instance is
/// shared by all caller contexts.
#[derive(Clone)]
pub struct OrderService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn OrderStore>,
    bus: NotificationBus,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn OrderStore>,
        bus: NotificationBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            store,
            bus,
            clock,
        }
    }

    /// Validates `draft` and inserts it as a new `Pending` order owned by
    /// `caller`. Publishes [`OrderEvent::Created`] after the insert commits.
    #[instrument(skip(self, draft))]
    pub async fn create_order(
        &self,
        caller: &UserId,
        draft: OrderDraft,
    ) -> Result<Order, OrderError> {
        debug!(?draft, "create_order called");
        let identity = self.resolve(caller).await?;

        let new_order = draft.validate(identity.id, self.clock.now())?;
        let order = self.store.insert(new_order).await?;
        info!(order_id = %order.id, owner = %order.owner, "Order created");

        self.bus.publish(OrderEvent::Created { order_id: order.id });
        Ok(order)
    }

    /// The caller's own orders, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, caller: &UserId) -> Result<Vec<Order>, OrderError> {
        let identity = self.resolve(caller).await?;
        let orders = self.store.query_by_owner(&identity.id).await?;
        debug!(count = orders.len(), "orders_for_user");
        Ok(orders)
    }

    /// All orders, optionally restricted to one status. Admin only.
    #[instrument(skip(self))]
    pub async fn all_orders(
        &self,
        caller: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        let identity = self.resolve(caller).await?;
        if !identity.is_admin() {
            warn!(caller = %caller, "all_orders denied");
            return Err(OrderError::Auth(format!(
                "{caller} lacks the Admin role required to list all orders"
            )));
        }
        let orders = self.store.query_all(status).await?;
        debug!(count = orders.len(), "all_orders");
        Ok(orders)
    }

    /// Moves an order to `target` if the caller is allowed to and the
    /// transition is legal from the order's current status.
    ///
    /// The store write is conditioned on the status observed here; if a
    /// concurrent call committed first, this one fails with
    /// [`OrderError::InvalidTransition`] instead of overwriting. Publishes
    /// [`OrderEvent::Updated`] only after the write commits.
    #[instrument(skip(self))]
    pub async fn advance_status(
        &self,
        caller: &UserId,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, OrderError> {
        let identity = self.resolve(caller).await?;

        let order = self
            .store
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        self.authorize_transition(&identity, &order, target)?;

        if !order.status.can_transition_to(target) {
            warn!(order_id = %order_id, from = %order.status, to = %target, "Illegal transition");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let updated = self
            .store
            .update_status_if_current(order_id, order.status, target)
            .await?
            .ok_or_else(|| {
                // A concurrent update won the race; the observed status is stale.
                warn!(order_id = %order_id, expected = %order.status, "Lost status race");
                OrderError::InvalidTransition {
                    from: order.status,
                    to: target,
                }
            })?;

        info!(order_id = %updated.id, status = %updated.status, "Status advanced");
        self.bus.publish(OrderEvent::Updated {
            order_id: updated.id,
            status: updated.status,
        });
        Ok(updated)
    }

    /// Role rules per target status: Admin moves work forward, only the
    /// owner cancels. Checked before transition legality.
    fn authorize_transition(
        &self,
        identity: &Identity,
        order: &Order,
        target: OrderStatus,
    ) -> Result<(), OrderError> {
        let is_owner = identity.id == order.owner;
        if !identity.is_admin() && !is_owner {
            return Err(OrderError::Auth(format!(
                "{} may not modify order {}",
                identity.id, order.id
            )));
        }
        match target {
            OrderStatus::InProgress | OrderStatus::Completed if !identity.is_admin() => {
                Err(OrderError::Auth(format!(
                    "{} lacks the Admin role required for the {target} transition",
                    identity.id
                )))
            }
            OrderStatus::Cancelled if !is_owner => Err(OrderError::Auth(format!(
                "only the owner of order {} may cancel it",
                order.id
            ))),
            _ => Ok(()),
        }
    }

    async fn resolve(&self, caller: &UserId) -> Result<Identity, OrderError> {
        match self.identity.resolve(caller).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => {
                warn!(caller = %caller, "Unknown caller");
                Err(OrderError::Auth(format!("unknown caller: {caller}")))
            }
            Err(IdentityError::Unavailable(reason)) => {
                Err(OrderError::StoreUnavailable(reason))
            }
        }
    }
}
