//! # Catalog Actor
//!
//! Owns every artwork and its availability flag. It is the only place availability changes, and
//! the reservation engine drives it through batch actions so a whole cart is claimed or none of it.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for
//!   [`CatalogItem`](crate::model::CatalogItem)
//! - [`actions`] - [`ItemAction`] and [`ItemActionResult`]
//! - [`error`] - [`CatalogError`]
//!
//! ## Custom Actions
//!
//! ```rust,ignore
//! let free = catalog.check_availability(item_id).await?;
//! let reserved = catalog.reserve_all(vec![a, b], reservation).await?;
//! catalog.release_all(vec![a, b], reservation).await?;
//! catalog.restore(item_id).await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CatalogClient;
use crate::model::{CatalogItem, ItemId};
use actor_framework::{FrameworkError, ResourceActor, SharedStore};

/// Creates a new in-memory Catalog actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<CatalogItem>, CatalogClient) {
    let (actor, generic_client) = ResourceActor::new(capacity);
    (actor, CatalogClient::new(generic_client))
}

/// Creates a Catalog actor restored from `store`.
pub async fn with_store(
    capacity: usize,
    store: SharedStore<ItemId, CatalogItem>,
) -> Result<(ResourceActor<CatalogItem>, CatalogClient), FrameworkError> {
    let (actor, generic_client) = ResourceActor::with_store(capacity, store).await?;
    Ok((actor, CatalogClient::new(generic_client)))
}
