//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every resource (User, CatalogItem, Order, …) implements
//! to be managed by the generic [`ResourceActor`](crate::ResourceActor). It fixes the associated
//! types for ids, DTOs, actions, context and errors, and provides the lifecycle hooks
//! (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::is_read_only`]
//!
//! You do **not** need to implement these unless you want to customize behavior.
//!
//! # Staged Mutation
//! Hooks never mutate the stored entity directly. The actor hands them a **clone**, persists the
//! clone, and only then swaps it in. A hook that returns `Err` therefore leaves no trace, and a hook
//! that succeeds but whose write fails leaves no trace either.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., calling other actors).
/// It also defines a `Context` type, which is injected into every hook. This allows "Late Binding"
/// of dependencies (passing clients to `run()` instead of `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    ///
    /// Ids are allocated from a `u32` counter; `Into<u32>` lets a restored actor resume the
    /// counter after the highest persisted id.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32> + Into<u32> + 'static;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `Reserve`).
    ///
    /// `Clone` because a batch action applies the same value to several entities.
    type Action: Clone + Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: clients match on a single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The id this entity is stored under.
    fn id(&self) -> Self::Id;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called immediately after the entity is created and initialized, before it is persisted.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;

    /// Actions that never mutate the entity skip the store write.
    fn is_read_only(_action: &Self::Action) -> bool {
        false
    }
}
