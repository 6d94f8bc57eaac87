//! Observability setup.
//!
//! Structured logging with the `tracing` crate: service entry points carry
//! `#[instrument]` spans, the store actor and bus log structured fields
//! (`order_id`, `status`, `subscribers`), and verbosity is controlled via
//! `RUST_LOG`.
//!
//! ```bash
//! # Compact logs
//! RUST_LOG=info cargo run
//!
//! # Full payloads (drafts, events) at function entry
//! RUST_LOG=debug cargo run
//! ```

/// Installs the process-wide subscriber. Call once at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // structured fields carry the context instead
        .compact()
        .init();
}
