//! # Inventory Reservation Engine
//!
//! Claims a cart of one-of-a-kind items for a single buyer: either every item flips to
//! unavailable or none does.
//!
//! The atomicity comes from the catalog actor. The whole cart travels as one
//! [`BatchAction`](actor_framework::ResourceRequest::BatchAction) and the actor processes it on
//! staged copies, committing only when every item accepts and the store write succeeds. Every
//! other request to the catalog sees the cart either entirely before or entirely after.
//!
//! Each attempt carries a fresh [`ReservationId`]. Release only frees items still held by that
//! id, so compensating a timed-out attempt can never free an item that a competing buyer won.

use crate::catalog_actor::CatalogError;
use crate::clients::CatalogClient;
use crate::model::{ItemId, ReservationId, ReservedItem};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Items claimed by one successful [`ReservationEngine::reserve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedSet {
    pub reservation_id: ReservationId,
    /// In request order, with the price each item had at reservation time.
    pub items: Vec<ReservedItem>,
}

impl ReservedSet {
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReservationError {
    #[error("No items to reserve")]
    Empty,

    #[error("Item {0} requested more than once")]
    DuplicateItem(ItemId),

    /// Missing or already reserved items; nothing was claimed.
    #[error("Items unavailable: {ids:?}")]
    ItemsUnavailable { ids: Vec<ItemId> },

    /// The catalog did not answer in time; the attempt has been compensated.
    #[error("Reservation timed out after {0:?}")]
    TimedOut(Duration),

    /// The catalog could not complete the request (store or channel failure).
    #[error("Reservation failed: {0}")]
    Unavailable(String),
}

/// Reserves and releases carts against the catalog actor.
#[derive(Clone)]
pub struct ReservationEngine {
    catalog: CatalogClient,
    timeout: Duration,
}

impl ReservationEngine {
    pub fn new(catalog: CatalogClient, timeout: Duration) -> Self {
        Self { catalog, timeout }
    }

    /// Claims every item in `ids` under a new reservation, or none of them.
    ///
    /// `ids` must be non-empty and distinct.
    #[instrument(skip(self))]
    pub async fn reserve(&self, ids: &[ItemId]) -> Result<ReservedSet, ReservationError> {
        if ids.is_empty() {
            return Err(ReservationError::Empty);
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(ReservationError::DuplicateItem(*duplicate));
        }

        let reservation_id = ReservationId::new();
        let attempt = self.catalog.reserve_all(ids.to_vec(), reservation_id);

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(items)) => {
                info!(%reservation_id, count = items.len(), "Reserved");
                Ok(ReservedSet {
                    reservation_id,
                    items,
                })
            }
            Ok(Err(CatalogError::ItemsUnavailable(ids))) => {
                info!(?ids, "Reservation refused");
                Err(ReservationError::ItemsUnavailable { ids })
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Reservation failed");
                Err(ReservationError::Unavailable(e.to_string()))
            }
            Err(_) => {
                warn!(%reservation_id, timeout = ?self.timeout, "Reservation timed out, compensating");
                self.compensate(ids.to_vec(), reservation_id).await;
                Err(ReservationError::TimedOut(self.timeout))
            }
        }
    }

    /// Frees the items of `reserved` that it still holds. Safe to call more than once.
    #[instrument(skip(self, reserved), fields(reservation_id = %reserved.reservation_id))]
    pub async fn release(&self, reserved: &ReservedSet) -> Result<Vec<ItemId>, ReservationError> {
        let attempt = self
            .catalog
            .release_all(reserved.item_ids(), reserved.reservation_id);

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(freed)) => {
                info!(?freed, "Released");
                Ok(freed)
            }
            Ok(Err(e)) => Err(ReservationError::Unavailable(e.to_string())),
            Err(_) => Err(ReservationError::TimedOut(self.timeout)),
        }
    }

    /// The timed-out batch may still be queued in the catalog mailbox. The release is queued
    /// behind it, so whatever it claims is freed again.
    async fn compensate(&self, ids: Vec<ItemId>, reservation_id: ReservationId) {
        let release = self.catalog.release_all(ids.clone(), reservation_id);
        match tokio::time::timeout(self.timeout, release).await {
            Ok(Ok(freed)) => info!(?freed, %reservation_id, "Compensated timed-out reservation"),
            Ok(Err(e)) => error!(
                ?ids, %reservation_id, error = %e,
                "Compensation failed; items may stay unavailable until restored by an operator"
            ),
            Err(_) => error!(
                ?ids, %reservation_id,
                "Compensation timed out; items may stay unavailable until restored by an operator"
            ),
        }
    }
}
