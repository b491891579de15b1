//! Error types for the Catalog actor.

use crate::model::ItemId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The requested item was not found.
    #[error("Catalog item not found: {0}")]
    NotFound(String),

    /// A single item is no longer available.
    #[error("Catalog item {0} is unavailable")]
    Unavailable(ItemId),

    /// A batch reservation was refused; lists every item that caused it.
    #[error("Catalog items unavailable: {0:?}")]
    ItemsUnavailable(Vec<ItemId>),

    /// Prices are never negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    /// The item data provided is invalid.
    #[error("Catalog validation error: {0}")]
    ValidationError(String),

    /// The catalog's backing store rejected the write.
    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),

    /// The actor answered with a result that does not match the action sent.
    #[error("Unexpected catalog response: {0}")]
    UnexpectedResponse(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CatalogError {
    fn from(msg: String) -> Self {
        CatalogError::ActorCommunicationError(msg)
    }
}
