use std::sync::Arc;

use tracing::{error, info};

use crate::bus::NotificationBus;
use crate::clock::SystemClock;
use crate::identity::Directory;
use crate::lifecycle::OrderService;
use crate::store::StoreActor;

/// The runtime orchestrator for the delivery-order core.
///
/// `DeliverySystem` is responsible for:
/// - **Lifecycle management**: spawning the store actor and shutting it down
/// - **Dependency wiring**: injecting identity, store, bus and clock into
///   the [`OrderService`]
///
/// # Example
///
/// ```ignore
/// let system = DeliverySystem::new(directory);
/// let mut events = system.bus.subscribe();
///
/// let order = system.service.create_order(&caller, draft).await?;
///
/// system.shutdown().await?;
/// ```
pub struct DeliverySystem {
    /// The order lifecycle service, shared by all caller contexts.
    pub service: OrderService,

    /// The notification bus dashboards subscribe to.
    pub bus: NotificationBus,

    /// Task handle for the store actor (used for graceful shutdown).
    store_handle: tokio::task::JoinHandle<()>,
}

impl DeliverySystem {
    /// Wires up a complete system over the in-memory store and the system
    /// clock. The `directory` is the identity provider for this process.
    pub fn new(directory: Directory) -> Self {
        let (store_actor, store) = StoreActor::new();
        let store_handle = tokio::spawn(store_actor.run());

        let bus = NotificationBus::new();
        let service = OrderService::new(
            Arc::new(directory),
            Arc::new(store),
            bus.clone(),
            Arc::new(SystemClock),
        );

        Self {
            service,
            bus,
            store_handle,
        }
    }

    /// Gracefully shuts the system down.
    ///
    /// Dropping the service releases its store handle; once every clone is
    /// gone the store actor drains its queue and exits. Returns an error if
    /// the actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.service);

        if let Err(e) = self.store_handle.await {
            error!("Store task failed: {e:?}");
            return Err(format!("store task failed: {e:?}"));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
