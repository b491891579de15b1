//! # Checkout Service
//!
//! Places orders and serves them back to their owners.
//!
//! ```text
//! place_order
//!   ├─ validate cart (non-empty, quantity 1, distinct items, address + payment present)
//!   ├─ UserActor        buyer exists?
//!   ├─ ReservationEngine   claim every item or none      ──┐
//!   ├─ SequencerActor   next INV-YYYYMMDD-NNN             │ on failure:
//!   └─ OrderActor       persist order + lines             ─┴─ release the reservation
//! ```
//!
//! The service holds only clients, so unrelated placements proceed in parallel. The catalog and
//! sequencer actors are the only shared mutable state, and each of them serializes just its own
//! short step. Validation and the buyer lookup run in the caller's task; everything from the
//! reservation on runs in a spawned task that outlives a cancelled caller.

use crate::access::{authorize, Requester};
use crate::clients::{OrderClient, UserClient};
use crate::clock::Clock;
use crate::config::CheckoutConfig;
use crate::model::{
    Invoice, ItemId, Order, OrderCreate, OrderId, OrderLine, PlaceOrderRequest, User, UserId,
};
use crate::order_actor::OrderError;
use crate::reservation::{ReservationEngine, ReservationError, ReservedSet};
use crate::sequencer::SequencerClient;
use crate::user_actor::UserError;
use actor_framework::ActorClient;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn, Instrument};

/// Entry point for placing and reading orders.
///
/// Cheap to clone; every clone talks to the same actors.
#[derive(Clone)]
pub struct CheckoutService {
    users: UserClient,
    orders: OrderClient,
    reservations: ReservationEngine,
    sequencer: SequencerClient,
    clock: Arc<dyn Clock>,
    sequencer_timeout: Duration,
    tax_rate: Decimal,
}

impl CheckoutService {
    pub fn new(
        users: UserClient,
        orders: OrderClient,
        reservations: ReservationEngine,
        sequencer: SequencerClient,
        clock: Arc<dyn Clock>,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            users,
            orders,
            reservations,
            sequencer,
            clock,
            sequencer_timeout: config.sequencer_timeout,
            tax_rate: config.tax_rate,
        }
    }

    /// Places an order for `requester`.
    ///
    /// On success every item in the cart is unavailable and the returned order is `Pending` with
    /// a fresh invoice number. On failure no item has changed availability.
    ///
    /// Reservation, numbering and persistence run in a task of their own, so dropping the
    /// returned future does not interrupt them: the order is still recorded, or the reservation
    /// is released.
    #[instrument(skip(self, requester, request), fields(buyer = %requester.user_id))]
    pub async fn place_order(
        &self,
        requester: &Requester,
        request: PlaceOrderRequest,
    ) -> Result<Order, OrderError> {
        let item_ids = validate(&request)?;
        let buyer = self.require_buyer(requester.user_id).await?;

        let service = self.clone();
        let placement = tokio::spawn(
            async move { service.reserve_and_record(buyer, item_ids, request).await }
                .in_current_span(),
        );
        placement.await.map_err(|e| {
            error!(error = %e, "Placement task did not complete");
            OrderError::ActorCommunicationError(format!("placement task failed: {e}"))
        })?
    }

    async fn reserve_and_record(
        &self,
        buyer: User,
        item_ids: Vec<ItemId>,
        request: PlaceOrderRequest,
    ) -> Result<Order, OrderError> {
        let reserved = self
            .reservations
            .reserve(&item_ids)
            .await
            .map_err(reservation_error)?;

        let created_at = self.clock.now();
        let invoice_number = match tokio::time::timeout(
            self.sequencer_timeout,
            self.sequencer.next_invoice_number(created_at.date_naive()),
        )
        .await
        {
            Ok(Ok(number)) => number,
            Ok(Err(e)) => {
                self.abandon(&reserved, &e.to_string()).await;
                return Err(OrderError::SequencerUnavailable(e.to_string()));
            }
            Err(_) => {
                let reason = format!("no invoice number within {:?}", self.sequencer_timeout);
                self.abandon(&reserved, &reason).await;
                return Err(OrderError::SequencerUnavailable(reason));
            }
        };
        info!(invoice = %invoice_number, "Issued invoice number");

        let create = OrderCreate {
            user_id: buyer.id,
            username: buyer.username,
            created_at,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            invoice_number,
            reservation_id: reserved.reservation_id,
            lines: reserved.items.iter().map(OrderLine::from_reserved).collect(),
        };

        let id = match self.orders.create_order(create.clone()).await {
            Ok(id) => id,
            Err(e) => {
                self.abandon(&reserved, &e.to_string()).await;
                return Err(match e {
                    OrderError::InvalidRequest(reason) => OrderError::InvalidRequest(reason),
                    other => OrderError::PersistenceFailed(other.to_string()),
                });
            }
        };

        let order = Order::from_create(id, create);
        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(order)
    }

    /// The order, if `requester` may see it.
    #[instrument(skip(self, requester), fields(requester = %requester.user_id))]
    pub async fn get_order(&self, requester: &Requester, id: OrderId) -> Result<Order, OrderError> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        if !authorize(requester, &order) {
            warn!(order_id = %id, "Access denied");
            return Err(OrderError::Unauthorized);
        }
        Ok(order)
    }

    /// Every order for administrators; only their own for everybody else. Sorted by id.
    #[instrument(skip(self, requester), fields(requester = %requester.user_id))]
    pub async fn list_orders(&self, requester: &Requester) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.list().await?;
        Ok(orders
            .into_iter()
            .filter(|order| authorize(requester, order))
            .collect())
    }

    /// The invoice for an order, under the same access rule as [`get_order`](Self::get_order).
    #[instrument(skip(self, requester), fields(requester = %requester.user_id))]
    pub async fn get_invoice(
        &self,
        requester: &Requester,
        order_id: OrderId,
    ) -> Result<Invoice, OrderError> {
        let order = self.get_order(requester, order_id).await?;
        let customer = self
            .users
            .get(order.user_id)
            .await
            .map_err(user_error)?
            .ok_or_else(|| OrderError::NotFound(format!("customer {}", order.user_id)))?;

        Ok(Invoice::for_order(&order, &customer, self.tax_rate))
    }

    async fn require_buyer(&self, id: UserId) -> Result<User, OrderError> {
        match self.users.find_user(id).await {
            Ok(user) => Ok(user),
            Err(UserError::NotFound(_)) => {
                Err(OrderError::InvalidRequest(format!("unknown buyer {id}")))
            }
            Err(e) => Err(user_error(e)),
        }
    }

    /// Releases a reservation after a later step failed. A release that fails leaves items
    /// unavailable with no order behind them, which needs an operator.
    async fn abandon(&self, reserved: &ReservedSet, reason: &str) {
        warn!(reservation_id = %reserved.reservation_id, reason, "Placement failed after reservation, releasing");
        if let Err(e) = self.reservations.release(reserved).await {
            error!(
                reservation_id = %reserved.reservation_id,
                items = ?reserved.item_ids(),
                error = %e,
                "Could not release reserved items; catalog needs manual reconciliation"
            );
        }
    }
}

/// Returns the requested item ids in cart order.
fn validate(request: &PlaceOrderRequest) -> Result<Vec<ItemId>, OrderError> {
    if request.lines.is_empty() {
        return Err(OrderError::InvalidRequest("an order needs at least one line".into()));
    }
    if request.shipping_address.trim().is_empty() {
        return Err(OrderError::InvalidRequest("shipping address is required".into()));
    }
    if request.payment_method.trim().is_empty() {
        return Err(OrderError::InvalidRequest("payment method is required".into()));
    }

    let mut seen = HashSet::with_capacity(request.lines.len());
    for line in &request.lines {
        if line.quantity != 1 {
            return Err(OrderError::InvalidRequest(format!(
                "{} requested with quantity {}; each artwork is unique",
                line.item_id, line.quantity
            )));
        }
        if !seen.insert(line.item_id) {
            return Err(OrderError::InvalidRequest(format!(
                "{} appears more than once",
                line.item_id
            )));
        }
    }

    Ok(request.lines.iter().map(|line| line.item_id).collect())
}

fn reservation_error(e: ReservationError) -> OrderError {
    match e {
        ReservationError::Empty | ReservationError::DuplicateItem(_) => {
            OrderError::InvalidRequest(e.to_string())
        }
        ReservationError::ItemsUnavailable { ids } => OrderError::ItemsUnavailable { ids },
        ReservationError::TimedOut(_) | ReservationError::Unavailable(_) => {
            OrderError::ReservationFailed(e.to_string())
        }
    }
}

fn user_error(e: UserError) -> OrderError {
    OrderError::ActorCommunicationError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderLineRequest;

    fn request(lines: Vec<OrderLineRequest>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            shipping_address: "221B Baker Street".into(),
            payment_method: "card".into(),
            lines,
        }
    }

    #[test]
    fn test_validate_keeps_cart_order() {
        let ids = validate(&request(vec![
            OrderLineRequest::single(ItemId(3)),
            OrderLineRequest::single(ItemId(1)),
        ]))
        .unwrap();
        assert_eq!(ids, vec![ItemId(3), ItemId(1)]);
    }

    #[test]
    fn test_validate_rejects_bad_carts() {
        let bad = [
            request(vec![]),
            request(vec![OrderLineRequest {
                item_id: ItemId(1),
                quantity: 0,
            }]),
            request(vec![OrderLineRequest {
                item_id: ItemId(1),
                quantity: 2,
            }]),
            request(vec![
                OrderLineRequest::single(ItemId(1)),
                OrderLineRequest::single(ItemId(1)),
            ]),
            PlaceOrderRequest {
                shipping_address: "  ".into(),
                ..request(vec![OrderLineRequest::single(ItemId(1))])
            },
            PlaceOrderRequest {
                payment_method: String::new(),
                ..request(vec![OrderLineRequest::single(ItemId(1))])
            },
        ];

        for cart in bad {
            assert!(matches!(validate(&cart), Err(OrderError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_reservation_errors_follow_the_taxonomy() {
        assert!(matches!(
            reservation_error(ReservationError::ItemsUnavailable { ids: vec![ItemId(2)] }),
            OrderError::ItemsUnavailable { ids } if ids == vec![ItemId(2)]
        ));
        assert!(reservation_error(ReservationError::TimedOut(Duration::from_secs(1))).is_retryable());
        assert!(!reservation_error(ReservationError::Empty).is_retryable());
    }
}
