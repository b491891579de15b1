//! Custom actions for the Catalog actor.
//!
//! Availability is the only mutable state an artwork has. It changes through these actions,
//! and a multi-item reservation sends one of them to many items as a single
//! [`BatchAction`](actor_framework::ResourceRequest::BatchAction).

use crate::model::{ReservationId, ReservedItem};

/// Custom actions for [`CatalogItem`](crate::model::CatalogItem) entities.
#[derive(Debug, Clone)]
pub enum ItemAction {
    /// Reports whether the item can be reserved. Read-only.
    CheckAvailability,
    /// Claims the item for the given reservation.
    ///
    /// # Errors
    /// Fails with [`CatalogError::Unavailable`](super::CatalogError::Unavailable) if the item is
    /// already unavailable.
    Reserve(ReservationId),
    /// Frees the item, but only if the given reservation is the one holding it.
    Release(ReservationId),
    /// Administrative override: makes the item available regardless of who holds it.
    Restore,
}

/// Results from ItemActions - variants match 1:1 with ItemAction
#[derive(Debug, Clone, PartialEq)]
pub enum ItemActionResult {
    Availability(bool),
    Reserved(ReservedItem),
    /// `true` if this call freed the item.
    Released(bool),
    Restored,
}
