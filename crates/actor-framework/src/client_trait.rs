//! # ActorClient Trait
//!
//! Typed clients wrap a [`ResourceClient`] and translate [`FrameworkError`] into their own error
//! enum. Implementing this trait gives them `get`, `list` and `delete` for free.

use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Shared read and delete surface of every typed client.
///
/// `map_error` is where a client decides what a store failure or a dropped actor means for its
/// callers; entity errors come back boxed and are usually downcast to the entity's own type.
///
/// ```rust,ignore
/// #[async_trait]
/// impl ActorClient<CatalogItem> for CatalogClient {
///     type Error = CatalogError;
///
///     fn inner(&self) -> &ResourceClient<CatalogItem> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         match e {
///             FrameworkError::EntityError(inner) => match inner.downcast::<CatalogError>() {
///                 Ok(err) => *err,
///                 Err(other) => CatalogError::ActorCommunicationError(other.to_string()),
///             },
///             FrameworkError::Store(err) => CatalogError::StoreUnavailable(err.to_string()),
///             other => CatalogError::ActorCommunicationError(other.to_string()),
///         }
///     }
/// }
///
/// let item = catalog.get(ItemId(3)).await?;
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: From<String> + Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    fn map_error(e: FrameworkError) -> Self::Error;

    /// `None` when nothing is stored under `id`.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending get");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Every entity, sorted by id.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending list");
        self.inner().list().await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending delete");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
