//! Error types for order placement and retrieval.

use crate::model::ItemId;
use thiserror::Error;

/// Errors that can occur during order operations.
///
/// | Variant | Kind | Retry? |
/// |---------|------|--------|
/// | `InvalidRequest` | caller error | no |
/// | `ItemsUnavailable` | business conflict | with a different cart |
/// | `SequencerUnavailable`, `PersistenceFailed`, `ReservationFailed` | infrastructure | after backoff |
/// | `Unauthorized` | access | no |
/// | `NotFound` | unknown order | no |
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The placement request is malformed or refers to an unknown buyer.
    #[error("Invalid order request: {0}")]
    InvalidRequest(String),

    /// One or more requested items are missing or already reserved.
    #[error("Items unavailable: {ids:?}")]
    ItemsUnavailable { ids: Vec<ItemId> },

    /// No invoice number could be issued.
    #[error("Invoice sequencer unavailable: {0}")]
    SequencerUnavailable(String),

    /// The order could not be written to the store.
    #[error("Order persistence failed: {0}")]
    PersistenceFailed(String),

    /// The reservation could not be completed (timeout or catalog store failure).
    #[error("Reservation failed: {0}")]
    ReservationFailed(String),

    /// The requester may not see this order.
    #[error("Not authorized to access this order")]
    Unauthorized,

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Infrastructure failures may succeed on a later attempt; everything else will not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::SequencerUnavailable(_)
                | OrderError::PersistenceFailed(_)
                | OrderError::ReservationFailed(_)
                | OrderError::ActorCommunicationError(_)
        )
    }
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
