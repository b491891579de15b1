//! # Framework Errors
//!
//! Common error types shared by every actor and client. Entity-specific failures travel
//! inside [`FrameworkError::EntityError`]; storage failures inside [`FrameworkError::Store`].

use crate::store::StoreError;

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FrameworkError {
    /// True when the failure came from the backing store rather than the entity or the channel.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, FrameworkError::Store(_))
    }
}
