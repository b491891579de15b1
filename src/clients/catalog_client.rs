//! # Catalog Client
//!
//! High-level API over the `CatalogItem` actor. Multi-item reservation and release go out as a
//! single batch message, so the actor applies each of them atomically.

use crate::catalog_actor::{CatalogError, ItemAction, ItemActionResult};
use crate::model::{
    CatalogItem, CatalogItemCreate, CatalogItemUpdate, ItemId, ReservationId, ReservedItem,
};
use actor_framework::{
    ActorClient, BatchOutcome, FrameworkError, Rejection, ResourceClient,
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Client for interacting with the Catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<CatalogItem>,
}

impl CatalogClient {
    pub fn new(inner: ResourceClient<CatalogItem>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<CatalogItem> for CatalogClient {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<CatalogItem> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<CatalogError>() {
                Ok(err) => *err,
                Err(other) => CatalogError::ActorCommunicationError(other.to_string()),
            },
            FrameworkError::NotFound(id) => CatalogError::NotFound(id),
            FrameworkError::Store(err) => CatalogError::StoreUnavailable(err.to_string()),
            other => CatalogError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl CatalogClient {
    /// Lists a new artwork. Prices below zero are refused.
    #[instrument(skip(self))]
    pub async fn create_item(&self, params: CatalogItemCreate) -> Result<ItemId, CatalogError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: ItemId,
        update: CatalogItemUpdate,
    ) -> Result<CatalogItem, CatalogError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Whether the item can currently be reserved.
    #[instrument(skip(self))]
    pub async fn check_availability(&self, id: ItemId) -> Result<bool, CatalogError> {
        debug!("Checking availability");
        match self
            .inner
            .perform_action(id, ItemAction::CheckAvailability)
            .await
            .map_err(Self::map_error)?
        {
            ItemActionResult::Availability(available) => Ok(available),
            other => Err(CatalogError::UnexpectedResponse(format!("{other:?}"))),
        }
    }

    /// Claims every item for `reservation`, or none of them.
    ///
    /// On refusal the error lists every item that was missing or already taken.
    #[instrument(skip(self))]
    pub async fn reserve_all(
        &self,
        ids: Vec<ItemId>,
        reservation: ReservationId,
    ) -> Result<Vec<ReservedItem>, CatalogError> {
        debug!("Reserving items");
        let outcome = self
            .inner
            .perform_batch(ids, ItemAction::Reserve(reservation))
            .await
            .map_err(Self::map_error)?;

        match outcome {
            BatchOutcome::Applied(results) => results
                .into_iter()
                .map(|(id, result)| match result {
                    ItemActionResult::Reserved(item) => Ok(item),
                    other => Err(CatalogError::UnexpectedResponse(format!("{id}: {other:?}"))),
                })
                .collect(),
            BatchOutcome::Rejected(rejections) => Err(CatalogError::ItemsUnavailable(
                rejections.iter().map(|r| *r.id()).collect(),
            )),
        }
    }

    /// Frees whichever of `ids` are still held by `reservation`; returns the ones it freed.
    ///
    /// Items held by another reservation are left alone. Items that have since been removed
    /// from the catalog are skipped.
    #[instrument(skip(self))]
    pub async fn release_all(
        &self,
        ids: Vec<ItemId>,
        reservation: ReservationId,
    ) -> Result<Vec<ItemId>, CatalogError> {
        debug!("Releasing items");
        let mut pending = ids;

        for _ in 0..2 {
            if pending.is_empty() {
                return Ok(Vec::new());
            }
            let outcome = self
                .inner
                .perform_batch(pending.clone(), ItemAction::Release(reservation))
                .await
                .map_err(Self::map_error)?;

            match outcome {
                BatchOutcome::Applied(results) => {
                    return Ok(results
                        .into_iter()
                        .filter(|(_, result)| *result == ItemActionResult::Released(true))
                        .map(|(id, _)| id)
                        .collect());
                }
                BatchOutcome::Rejected(rejections) => {
                    let missing: Vec<ItemId> = rejections
                        .iter()
                        .filter_map(|r| match r {
                            Rejection::NotFound(id) => Some(*id),
                            Rejection::Refused { .. } => None,
                        })
                        .collect();
                    if missing.len() != rejections.len() {
                        return Err(CatalogError::UnexpectedResponse(format!(
                            "release refused: {rejections:?}"
                        )));
                    }
                    warn!(?missing, %reservation, "Skipping items no longer in the catalog");
                    pending.retain(|id| !missing.contains(id));
                }
            }
        }

        Err(CatalogError::UnexpectedResponse(format!(
            "release of {pending:?} kept being rejected"
        )))
    }

    /// Administrative override: makes the item available again.
    #[instrument(skip(self))]
    pub async fn restore(&self, id: ItemId) -> Result<(), CatalogError> {
        debug!("Restoring availability");
        match self
            .inner
            .perform_action(id, ItemAction::Restore)
            .await
            .map_err(Self::map_error)?
        {
            ItemActionResult::Restored => Ok(()),
            other => Err(CatalogError::UnexpectedResponse(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::{create_mock_client, expect_action, expect_batch, MockClient};
    use rust_decimal_macros::dec;

    fn reserved(id: u32) -> ReservedItem {
        ReservedItem {
            id: ItemId(id),
            title: format!("Work {id}"),
            artist: "Hokusai".into(),
            price: dec!(10),
        }
    }

    #[tokio::test]
    async fn test_check_availability_returns_flag() {
        let (client, mut receiver) = create_mock_client::<CatalogItem>(10);
        let catalog = CatalogClient::new(client);

        let task = tokio::spawn(async move { catalog.check_availability(ItemId(3)).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, ItemId(3));
        assert!(matches!(action, ItemAction::CheckAvailability));
        responder
            .send(Ok(ItemActionResult::Availability(true)))
            .unwrap();

        assert_eq!(task.await.unwrap(), Ok(true));
    }

    #[tokio::test]
    async fn test_reserve_all_sends_one_batch() {
        let (client, mut receiver) = create_mock_client::<CatalogItem>(10);
        let catalog = CatalogClient::new(client);
        let reservation = ReservationId::new();

        let task = tokio::spawn(async move {
            catalog
                .reserve_all(vec![ItemId(1), ItemId(2)], reservation)
                .await
        });

        let (ids, action, responder) = expect_batch(&mut receiver)
            .await
            .expect("Expected BatchAction request");
        assert_eq!(ids, vec![ItemId(1), ItemId(2)]);
        assert!(matches!(action, ItemAction::Reserve(r) if r == reservation));
        responder
            .send(Ok(BatchOutcome::Applied(vec![
                (ItemId(1), ItemActionResult::Reserved(reserved(1))),
                (ItemId(2), ItemActionResult::Reserved(reserved(2))),
            ])))
            .unwrap();

        let items = task.await.unwrap().unwrap();
        assert_eq!(items, vec![reserved(1), reserved(2)]);
    }

    #[tokio::test]
    async fn test_reserve_all_reports_every_unavailable_item() {
        let mut mock = MockClient::<CatalogItem>::new();
        mock.expect_batch().return_ok(BatchOutcome::Rejected(vec![
            Rejection::Refused {
                id: ItemId(2),
                reason: "unavailable".into(),
            },
            Rejection::NotFound(ItemId(9)),
        ]));

        let catalog = CatalogClient::new(mock.client());
        let result = catalog
            .reserve_all(vec![ItemId(1), ItemId(2), ItemId(9)], ReservationId::new())
            .await;

        assert_eq!(
            result,
            Err(CatalogError::ItemsUnavailable(vec![ItemId(2), ItemId(9)]))
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_release_all_skips_items_removed_from_catalog() {
        let mut mock = MockClient::<CatalogItem>::new();
        mock.expect_batch()
            .return_ok(BatchOutcome::Rejected(vec![Rejection::NotFound(ItemId(2))]));
        mock.expect_batch().return_ok(BatchOutcome::Applied(vec![(
            ItemId(1),
            ItemActionResult::Released(true),
        )]));

        let catalog = CatalogClient::new(mock.client());
        let freed = catalog
            .release_all(vec![ItemId(1), ItemId(2)], ReservationId::new())
            .await
            .unwrap();

        assert_eq!(freed, vec![ItemId(1)]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_store_failures_are_distinguished() {
        let mut mock = MockClient::<CatalogItem>::new();
        mock.expect_batch()
            .return_err(FrameworkError::Store(actor_framework::StoreError::Unavailable(
                "disk full".into(),
            )));

        let catalog = CatalogClient::new(mock.client());
        let result = catalog
            .reserve_all(vec![ItemId(1)], ReservationId::new())
            .await;

        assert!(matches!(result, Err(CatalogError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_update_item_changes_only_descriptive_fields() {
        let (actor, catalog) = crate::catalog_actor::new(8);
        tokio::spawn(actor.run(()));

        let id = catalog
            .create_item(CatalogItemCreate::artwork("Untitled", "Hokusai", dec!(120)))
            .await
            .unwrap();
        catalog
            .reserve_all(vec![id], ReservationId::new())
            .await
            .unwrap();

        let refused = catalog
            .update_item(
                id,
                CatalogItemUpdate {
                    title: Some("   ".into()),
                    artist: None,
                },
            )
            .await;
        assert!(matches!(refused, Err(CatalogError::ValidationError(_))));
        assert_eq!(catalog.get(id).await.unwrap().unwrap().title, "Untitled");

        let updated = catalog
            .update_item(
                id,
                CatalogItemUpdate {
                    title: Some("The Great Wave".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "The Great Wave");
        assert_eq!(updated.artist, "Hokusai");
        assert_eq!(updated.price, dec!(120));
        assert!(!updated.available);
        assert!(updated.reserved_by.is_some());
        assert_eq!(catalog.get(id).await.unwrap().unwrap(), updated);
    }
}
