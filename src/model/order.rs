use crate::model::{InvoiceNumber, ItemId, ReservationId, ReservedItem, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<OrderId> for u32 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Placement only ever produces `Pending`; the other states belong to fulfilment workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Fulfilled,
    Cancelled,
}

/// One purchased item, with title, artist and price captured at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub title: String,
    pub artist: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    /// A single-unit line for an item the reservation captured.
    pub fn from_reserved(item: &ReservedItem) -> Self {
        Self {
            item_id: item.id,
            title: item.title.clone(),
            artist: item.artist.clone(),
            price: item.price,
            quantity: 1,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Represents a placed order together with its lines.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for details on:
/// - Creation parameters ([`OrderCreate`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// The buyer's username at the time of purchase, shown in order listings.
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub invoice_number: InvoiceNumber,
    pub reservation_id: ReservationId,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

/// Payload for persisting a new order. The total is derived from `lines`.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub shipping_address: String,
    pub payment_method: String,
    pub invoice_number: InvoiceNumber,
    pub reservation_id: ReservationId,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Builds a `Pending` order whose total is the sum of its line subtotals.
    pub fn from_create(id: OrderId, params: OrderCreate) -> Self {
        let total = params.lines.iter().map(OrderLine::subtotal).sum();
        Self {
            id,
            user_id: params.user_id,
            username: params.username,
            created_at: params.created_at,
            status: OrderStatus::Pending,
            shipping_address: params.shipping_address,
            payment_method: params.payment_method,
            invoice_number: params.invoice_number,
            reservation_id: params.reservation_id,
            total,
            lines: params.lines,
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }
}

/// A requested cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub item_id: ItemId,
    pub quantity: u32,
}

impl OrderLineRequest {
    pub fn single(item_id: ItemId) -> Self {
        Self {
            item_id,
            quantity: 1,
        }
    }
}

/// Everything a buyer submits at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address: String,
    pub payment_method: String,
    pub lines: Vec<OrderLineRequest>,
}

impl PlaceOrderRequest {
    /// One line of quantity 1 per item.
    pub fn for_items(
        items: &[ItemId],
        shipping_address: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            payment_method: payment_method.into(),
            lines: items.iter().copied().map(OrderLineRequest::single).collect(),
        }
    }
}
