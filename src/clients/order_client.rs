use crate::model::{Order, OrderCreate, OrderId};
use crate::order_actor::OrderError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
///
/// Persistence only: orders arrive here fully priced and numbered by
/// [`CheckoutService`](crate::checkout::CheckoutService).
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Persists the order and its lines as one record.
    #[instrument(skip(self, order), fields(invoice = %order.invoice_number))]
    pub async fn create_order(&self, order: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(lines = order.lines.len(), "Sending create_order to actor");
        self.inner.create(order).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(err) => *err,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::Store(err) => OrderError::PersistenceFailed(err.to_string()),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
