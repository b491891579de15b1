//! # System Lifecycle & Orchestration
//!
//! Creates every actor, restores its state, wires the clients together and shuts everything
//! down again.
//!
//! ## Startup Order
//!
//! 1. **Stores** - [`Stores::in_memory`] or [`Stores::json_files`] (chosen by
//!    [`Stores::from_config`]).
//! 2. **Actors** - User, Catalog and Order actors are restored from their stores; the sequencer
//!    loads its counters.
//! 3. **Reconciliation** - sequencer counters are raised past every invoice number already on a
//!    persisted order; catalog items held by a reservation that no order refers to are reported.
//! 4. **Spawn** - each actor gets its own Tokio task.
//! 5. **Wire** - the [`CheckoutService`](crate::checkout::CheckoutService) receives clones of the
//!    clients it needs.
//!
//! ## Graceful Shutdown
//!
//! [`GallerySystem::shutdown`] drops every client it owns, which closes the actors' channels;
//! each actor drains its mailbox and exits. Clones handed out to callers keep their actor alive,
//! so drop them first.
//!
//! ## Observability
//!
//! Call [`setup_tracing`] once at startup; see [`actor_framework::tracing`].

pub mod gallery_system;

pub use actor_framework::tracing::setup_tracing;
pub use gallery_system::*;
