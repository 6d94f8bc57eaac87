//! # Lifecycle & Orchestration
//!
//! The business core of the crate. [`OrderService`] is the only component
//! with rules in it: it resolves callers, validates drafts, enforces the
//! status machine and its role requirements, performs the store mutation,
//! and publishes a notification after the mutation commits.
//!
//! [`DeliverySystem`] is the "conductor": it spawns the store actor, wires
//! up the service's dependencies, and coordinates graceful shutdown (drop
//! the handles, let the actor drain, then await its task).
//!
//! Dependencies are injected through the service constructor rather than
//! reached for as ambient state, so tests can substitute a fixed clock, a
//! failing store, or a captured-event bus without a web framework in sight.

pub mod error;
pub mod service;
pub mod system;
pub mod tracing;

pub use error::*;
pub use service::*;
pub use system::*;
pub use tracing::*;
