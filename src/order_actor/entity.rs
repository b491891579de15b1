//! [`ActorEntity`] implementation for [`Order`].
//!
//! The order actor only persists finished aggregates: reservation, numbering and pricing happen
//! in [`CheckoutService`](crate::checkout::CheckoutService) before `create` is sent, so
//! unrelated placements never queue behind each other here.

use super::OrderError;
use crate::model::{Order, OrderCreate, OrderId};
use actor_framework::ActorEntity;
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = OrderError;

    fn id(&self) -> OrderId {
        self.id
    }

    /// Builds the order and its lines as one unit.
    ///
    /// Rejects an empty order and blank shipping or payment details.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.lines.is_empty() {
            return Err(OrderError::InvalidRequest("an order needs at least one line".into()));
        }
        if params.shipping_address.trim().is_empty() {
            return Err(OrderError::InvalidRequest("shipping address is required".into()));
        }
        if params.payment_method.trim().is_empty() {
            return Err(OrderError::InvalidRequest("payment method is required".into()));
        }
        Ok(Order::from_create(id, params))
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
