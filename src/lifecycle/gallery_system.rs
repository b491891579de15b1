use crate::checkout::CheckoutService;
use crate::clients::{CatalogClient, OrderClient, UserClient};
use crate::clock::{Clock, SystemClock};
use crate::config::{CheckoutConfig, ConfigError};
use crate::model::{CatalogItem, ItemId, Order, OrderId, User, UserId};
use crate::reservation::ReservationEngine;
use crate::sequencer::{CounterStore, SequencerActor, SequencerError};
use crate::{catalog_actor, order_actor, user_actor};
use actor_framework::{FrameworkError, JsonFileStore, MemoryStore, SharedStore, StoreError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Failures while starting or stopping the system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Framework(#[from] FrameworkError),
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
}

/// Backing stores for every stateful component.
pub struct Stores {
    pub users: SharedStore<UserId, User>,
    pub catalog: SharedStore<ItemId, CatalogItem>,
    pub orders: SharedStore<OrderId, Order>,
    pub counters: CounterStore,
}

impl Stores {
    /// Process-lifetime stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::<UserId, User>::new()),
            catalog: Arc::new(MemoryStore::<ItemId, CatalogItem>::new()),
            orders: Arc::new(MemoryStore::<OrderId, Order>::new()),
            counters: Arc::new(MemoryStore::<NaiveDate, u32>::new()),
        }
    }

    /// One JSON snapshot file per component under `dir`.
    pub async fn json_files(dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            users: Arc::new(JsonFileStore::<UserId, User>::open(dir.join("users.json")).await?),
            catalog: Arc::new(
                JsonFileStore::<ItemId, CatalogItem>::open(dir.join("catalog.json")).await?,
            ),
            orders: Arc::new(JsonFileStore::<OrderId, Order>::open(dir.join("orders.json")).await?),
            counters: Arc::new(
                JsonFileStore::<NaiveDate, u32>::open(dir.join("invoice_counters.json")).await?,
            ),
        })
    }

    /// JSON files when `CHECKOUT_DATA_DIR` is configured, memory otherwise.
    pub async fn from_config(config: &CheckoutConfig) -> Result<Self, StoreError> {
        match &config.data_dir {
            Some(dir) => Self::json_files(dir).await,
            None => Ok(Self::in_memory()),
        }
    }
}

/// The running gallery backend.
///
/// # Example
///
/// ```ignore
/// let config = CheckoutConfig::from_env()?;
/// let system = GallerySystem::start(&config, Stores::from_config(&config).await?).await?;
///
/// let order = system.checkout.place_order(&requester, request).await?;
///
/// system.shutdown().await?;
/// ```
pub struct GallerySystem {
    pub user_client: UserClient,
    pub catalog_client: CatalogClient,
    pub order_client: OrderClient,
    pub checkout: CheckoutService,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl GallerySystem {
    /// Starts every actor with wall-clock time.
    pub async fn start(config: &CheckoutConfig, stores: Stores) -> Result<Self, SystemError> {
        Self::start_with_clock(config, stores, Arc::new(SystemClock)).await
    }

    /// Starts every actor, restoring state from `stores`.
    pub async fn start_with_clock(
        config: &CheckoutConfig,
        stores: Stores,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SystemError> {
        let capacity = config.mailbox_capacity;

        // 1. Create actors, restored from their stores
        let (user_actor, user_client) = user_actor::with_store(capacity, stores.users).await?;
        let (catalog_actor, catalog_client) =
            catalog_actor::with_store(capacity, stores.catalog).await?;
        let (order_actor, order_client) = order_actor::with_store(capacity, stores.orders).await?;
        let (mut sequencer_actor, sequencer_client) =
            SequencerActor::with_store(capacity, stores.counters).await?;

        // 2. Reconcile against persisted orders
        let orders = order_actor.snapshot();
        sequencer_actor
            .reconcile(orders.iter().map(|order| order.invoice_number))
            .await?;
        report_orphaned_reservations(&catalog_actor.snapshot(), &orders);

        // 3. Start actors
        let handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(catalog_actor.run(())),
            tokio::spawn(order_actor.run(())),
            tokio::spawn(sequencer_actor.run()),
        ];

        // 4. Wire the checkout service
        let reservations = ReservationEngine::new(catalog_client.clone(), config.reservation_timeout);
        let checkout = CheckoutService::new(
            user_client.clone(),
            order_client.clone(),
            reservations,
            sequencer_client,
            clock,
            config,
        );

        info!(restored_orders = orders.len(), "Gallery system started");
        Ok(Self {
            user_client,
            catalog_client,
            order_client,
            checkout,
            handles,
        })
    }

    /// Closes every channel this system owns and waits for the actors to finish.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.checkout);
        drop(self.order_client);
        drop(self.catalog_client);
        drop(self.user_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTask(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

/// Items that are held by a reservation no persisted order refers to were claimed by a
/// placement that never completed. They stay unavailable until an administrator restores them.
fn report_orphaned_reservations(items: &[CatalogItem], orders: &[Order]) {
    let placed: HashSet<_> = orders.iter().map(|order| order.reservation_id).collect();
    for item in items {
        if let Some(reservation) = item.reserved_by {
            if !placed.contains(&reservation) {
                warn!(item = %item.id, %reservation, "Item held by a reservation with no order");
            }
        }
    }
}
