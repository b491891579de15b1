//! # Observability & Tracing
//!
//! Structured logging for every actor in the system.
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`
//! (falling back to `info`). Module paths are hidden (`with_target(false)`); actors tag their
//! events with `entity_type` instead.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle + outcomes
//! RUST_LOG=debug cargo run     # every request with its payload
//! RUST_LOG=actor_framework=debug,gallery_checkout=info cargo run
//! ```
//!
//! Actors run in their own tasks, so their events carry no caller span. With `RUST_LOG=info`
//! a placement reads:
//!
//! ```text
//! INFO Batch applied entity_type="CatalogItem" count=2
//! INFO place_order{buyer=user_2}:reserve{ids=[ItemId(1), ItemId(2)]}: Reserved reservation_id=rsv_... count=2
//! INFO place_order{buyer=user_2}: Issued invoice number invoice=INV-20261019-001
//! INFO Created entity_type="Order" id=order_1 size=1
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`] but tolerates an already-installed subscriber. Meant for tests.
pub fn try_setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init();
}
