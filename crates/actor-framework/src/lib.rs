//! # Actor Framework
//!
//! Building blocks for type-safe, concurrent actor systems: one actor per resource type, each
//! owning its entities exclusively and talking to the rest of the system only through messages.
//!
//! ## Why Resources + Actors?
//!
//! - **Resource-Oriented**: every resource type (User, CatalogItem, Order) gets the same CRUD
//!   surface plus its own typed **actions**.
//! - **Actor Model**: each actor drains its mailbox sequentially, so its state needs no locks and
//!   two callers racing on the same entity are simply ordered.
//! - **Batch actions**: an actor can apply one action to several of its entities as a unit,
//!   which is how "reserve all of these or none of them" is expressed without a global lock.
//! - **Write-through storage**: every mutation goes through a [`Store`] before it is committed in
//!   memory, so a failed write never leaves a half-applied change behind.
//!
//! **Further Reading**:
//! - [Actor Model (Wikipedia)](https://en.wikipedia.org/wiki/Actor_model)
//! - [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/)
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - business rules and domain models
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing, batching, persistence
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - type-safe communication
//! 4. **Storage Layer** ([`Store`]) - [`MemoryStore`] or [`JsonFileStore`]
//!
//! ## Quick Start
//!
//! ```rust
//! use actor_framework::{ActorEntity, BatchOutcome, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Ticket {
//!     id: u32,
//!     claimed: bool,
//! }
//!
//! #[derive(Debug)] struct TicketCreate;
//! #[derive(Debug, Clone)] enum TicketAction { Claim }
//! #[derive(Debug)] struct AlreadyClaimed;
//!
//! impl std::fmt::Display for AlreadyClaimed {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "already claimed") }
//! }
//! impl std::error::Error for AlreadyClaimed {}
//!
//! #[async_trait]
//! impl ActorEntity for Ticket {
//!     type Id = u32;
//!     type Create = TicketCreate;
//!     type Update = ();
//!     type Action = TicketAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = AlreadyClaimed;
//!
//!     fn id(&self) -> u32 { self.id }
//!
//!     fn from_create_params(id: u32, _: TicketCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, claimed: false })
//!     }
//!
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
//!
//!     async fn handle_action(&mut self, _: TicketAction, _: &()) -> Result<(), Self::Error> {
//!         if self.claimed { return Err(AlreadyClaimed); }
//!         self.claimed = true;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Ticket>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let a = client.create(TicketCreate).await.unwrap();
//!     let b = client.create(TicketCreate).await.unwrap();
//!     client.perform_action(b, TicketAction::Claim).await.unwrap();
//!
//!     // `b` is already claimed, so `a` must stay unclaimed too.
//!     let outcome = client.perform_batch(vec![a, b], TicketAction::Claim).await.unwrap();
//!     assert!(matches!(outcome, BatchOutcome::Rejected(_)));
//!     assert!(!client.get(a).await.unwrap().unwrap().claimed);
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are injected at **runtime** through `run(context)`, not at construction time, so
//! actors that need each other's clients can all be created first and wired afterwards.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`mock::MockClient`] (canned responses, no actor) and
//! [`mock::FlakyStore`] (a store whose writes can be made to fail).

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod store;
pub mod tracing;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{BatchOutcome, Rejection, ResourceRequest, Response};
pub use store::{JsonFileStore, MemoryStore, SharedStore, Store, StoreError};
