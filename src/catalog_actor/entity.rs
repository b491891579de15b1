//! [`ActorEntity`] implementation for [`CatalogItem`].
//!
//! An item is purchasable while `available` is set. `Reserve` clears it and records the
//! reservation token; `Release` sets it again only for the same token. Because the actor applies
//! a batch of `Reserve` actions on staged copies and commits only when every item accepts, two
//! overlapping carts can never both claim an item.

use super::actions::{ItemAction, ItemActionResult};
use super::CatalogError;
use crate::model::{CatalogItem, CatalogItemCreate, CatalogItemUpdate, ItemId};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

#[async_trait]
impl ActorEntity for CatalogItem {
    type Id = ItemId;
    type Create = CatalogItemCreate;
    type Update = CatalogItemUpdate;
    type Action = ItemAction;
    type ActionResult = ItemActionResult;
    type Context = ();
    type Error = CatalogError;

    fn id(&self) -> ItemId {
        self.id
    }

    fn from_create_params(id: ItemId, params: CatalogItemCreate) -> Result<Self, Self::Error> {
        if params.price < Decimal::ZERO {
            return Err(CatalogError::InvalidPrice(params.price));
        }
        if params.title.trim().is_empty() {
            return Err(CatalogError::ValidationError("title is required".into()));
        }
        Ok(Self {
            id,
            title: params.title,
            artist: params.artist,
            price: params.price,
            available: params.available,
            reserved_by: None,
        })
    }

    async fn on_update(&mut self, update: CatalogItemUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(CatalogError::ValidationError("title is required".into()));
            }
            self.title = title;
        }
        if let Some(artist) = update.artist {
            self.artist = artist;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ItemAction,
        _ctx: &(),
    ) -> Result<ItemActionResult, Self::Error> {
        match action {
            ItemAction::CheckAvailability => Ok(ItemActionResult::Availability(self.available)),
            ItemAction::Reserve(reservation) => {
                if !self.available {
                    return Err(CatalogError::Unavailable(self.id));
                }
                self.available = false;
                self.reserved_by = Some(reservation);
                Ok(ItemActionResult::Reserved(self.reserved_view()))
            }
            ItemAction::Release(reservation) => {
                if self.reserved_by != Some(reservation) {
                    debug!(id = %self.id, %reservation, "Release ignored, not the holder");
                    return Ok(ItemActionResult::Released(false));
                }
                self.available = true;
                self.reserved_by = None;
                Ok(ItemActionResult::Released(true))
            }
            ItemAction::Restore => {
                self.available = true;
                self.reserved_by = None;
                Ok(ItemActionResult::Restored)
            }
        }
    }

    fn is_read_only(action: &ItemAction) -> bool {
        matches!(action, ItemAction::CheckAvailability)
    }
}
