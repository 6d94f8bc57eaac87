//! # Quickdrop
//!
//! > **The order-lifecycle core of a delivery-order tracking service.**
//!
//! Users submit delivery requests (what, where, by when); administrators
//! progress them through a fixed status lifecycle; every committed change is
//! pushed to connected dashboards over a broadcast bus. This crate is that
//! core; the web/page layer, credential storage and session handling live
//! elsewhere and are consumed through narrow seams.
//!
//! ## 🚀 Core Concepts
//!
//! ### One writer, one rulebook
//! [`lifecycle::OrderService`] is the sole writer of order state. Every
//! operation runs the same gauntlet: resolve the caller, authorize, check
//! the transition table, mutate, then notify. Authorization failures are
//! reported before transition-legality failures, so unauthorized callers
//! learn nothing about an order's state.
//!
//! ### The status machine
//! `Pending → InProgress → Completed`, or `Pending → Cancelled`. Nothing
//! leaves a terminal state. Admins move work forward; only the owner
//! cancels. The table lives on [`model::OrderStatus`].
//!
//! ### Store as an actor
//! The order table is owned by a single Tokio task ([`store::StoreActor`])
//! processing requests sequentially, which is exactly what makes
//! `update_status_if_current` a real compare-and-swap: of two racing status
//! updates, one commits and the other fails cleanly instead of overwriting.
//!
//! ### Best-effort notifications
//! [`bus::NotificationBus`] fans events out to every live subscriber.
//! Events are a resync hint, never authoritative state; publishing never
//! blocks a mutation and never fails one.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: pure data. [`model::Order`], the status machine, delivery
//!   zones, draft validation.
//! - [`identity`]: the consumed identity seam. [`identity::IdentityProvider`]
//!   plus the in-memory [`identity::Directory`].
//! - [`store`]: the consumed persistence seam. [`store::OrderStore`] plus
//!   the actor-backed in-memory implementation.
//! - [`bus`]: the broadcast notification channel.
//! - [`lifecycle`]: the service itself, its error type, the
//!   [`lifecycle::DeliverySystem`] orchestrator, and tracing setup.
//! - [`clock`]: injected time, so tests pin timestamps.
//!
//! ## Quick Start
//!
//! ```ignore
//! use quickdrop::identity::Directory;
//! use quickdrop::lifecycle::DeliverySystem;
//! use quickdrop::model::{OrderDraft, OrderStatus, Role};
//!
//! let directory = Directory::new()
//!     .with_user("alice", [Role::User])
//!     .with_user("root", [Role::User, Role::Admin]);
//! let system = DeliverySystem::new(directory);
//! let mut events = system.bus.subscribe();
//!
//! let order = system.service.create_order(&"alice".into(), OrderDraft {
//!     description: "K50 for 2L Milk".into(),
//!     location: "Campus".into(),
//!     estimated_time: "14:30".into(),
//!     instructions: None,
//! }).await?;
//!
//! system.service
//!     .advance_status(&"root".into(), order.id, OrderStatus::InProgress)
//!     .await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod bus;
pub mod clock;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod store;
