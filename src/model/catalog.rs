use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ItemId> for u32 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

/// Token identifying one reservation. Only the holder of the token can release what it claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub Uuid);

impl ReservationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rsv_{}", self.0)
    }
}

/// Represents one artwork in the gallery catalog.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for CatalogItem`](#impl-ActorEntity-for-CatalogItem) for details on:
/// - Creation parameters ([`CatalogItemCreate`])
/// - Update parameters ([`CatalogItemUpdate`])
/// - Custom actions ([`ItemAction`](crate::catalog_actor::ItemAction))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub artist: String,
    pub price: Decimal,
    pub available: bool,
    /// Set while a reservation holds the item; cleared by release or restore.
    pub reserved_by: Option<ReservationId>,
}

impl CatalogItem {
    /// Snapshot of the purchase-relevant fields, taken at reservation time.
    pub fn reserved_view(&self) -> ReservedItem {
        ReservedItem {
            id: self.id,
            title: self.title.clone(),
            artist: self.artist.clone(),
            price: self.price,
        }
    }
}

/// Payload for creating a catalog item.
#[derive(Debug, Clone)]
pub struct CatalogItemCreate {
    pub title: String,
    pub artist: String,
    pub price: Decimal,
    pub available: bool,
}

impl CatalogItemCreate {
    /// An available artwork.
    pub fn artwork(title: impl Into<String>, artist: impl Into<String>, price: Decimal) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            price,
            available: true,
        }
    }
}

/// Descriptive fields may change; price is fixed once listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogItemUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// An item as captured by a successful reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedItem {
    pub id: ItemId,
    pub title: String,
    pub artist: String,
    pub price: Decimal,
}
