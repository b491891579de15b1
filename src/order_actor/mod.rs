//! Order persistence actor.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::{Order, OrderId};
use actor_framework::{FrameworkError, ResourceActor, SharedStore};

/// Creates a new in-memory Order actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(capacity);
    (actor, OrderClient::new(generic_client))
}

/// Creates an Order actor restored from `store`.
pub async fn with_store(
    capacity: usize,
    store: SharedStore<OrderId, Order>,
) -> Result<(ResourceActor<Order>, OrderClient), FrameworkError> {
    let (actor, generic_client) = ResourceActor::with_store(capacity, store).await?;
    Ok((actor, OrderClient::new(generic_client)))
}
