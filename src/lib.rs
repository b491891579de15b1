//! # Gallery Checkout
//!
//! The order-placement core of an online art gallery. Every artwork is one of a kind, so the
//! interesting part is concurrency: two buyers must never both purchase the same piece, a cart
//! is claimed entirely or not at all, and every order gets a unique, per-day invoice number.
//!
//! ## Architecture Notes
//!
//! The system is built from resource actors (see [`actor_framework`]): each actor owns one kind
//! of entity and processes its mailbox sequentially.
//!
//! ### 1. Atomic Reservation
//! A cart is sent to the catalog actor as one batch action. The actor applies it to staged
//! copies and commits only if every item is available and the store write succeeds, so a
//! competing cart observes it entirely before or entirely after.
//!
//! ### 2. Invoice Numbering
//! A dedicated sequencer actor owns one durable counter per calendar date. No scanning of
//! existing orders, no retries on collision.
//!
//! ### 3. Compensation
//! If numbering or persistence fails after items were reserved, the reservation is released
//! before the error is returned. Releases are keyed by reservation id, so they can never free an
//! item somebody else holds.
//!
//! ### 4. Typed Errors
//! Each actor has its own `thiserror` enum; [`OrderError`](order_actor::OrderError) carries the
//! placement taxonomy and knows which failures are retryable.
//!
//! ## Module Tour
//!
//! - [`model`] - users, catalog items, orders, invoice numbers and invoices
//! - [`user_actor`], [`catalog_actor`], [`order_actor`] - the resource actors
//! - [`clients`] - typed wrappers around each actor's client
//! - [`reservation`] - all-or-nothing cart reservation with timeout compensation
//! - [`sequencer`] - per-date invoice numbers
//! - [`access`] - who may read an order
//! - [`checkout`] - `place_order`, `get_order`, `list_orders`, `get_invoice`
//! - [`lifecycle`] - startup, reconciliation, shutdown
//! - [`config`], [`clock`] - environment configuration and time source
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! CHECKOUT_DATA_DIR=./data RUST_LOG=debug cargo run
//! cargo test
//! ```

pub mod access;
pub mod catalog_actor;
pub mod checkout;
pub mod clients;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod reservation;
pub mod sequencer;
pub mod user_actor;
