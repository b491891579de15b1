//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the component that owns the state of one entity type.
//! It implements the "Server" side of the Actor Model: messages are processed sequentially, so the
//! entity map needs no locks, and every mutation is written through the configured
//! [`Store`](crate::store::Store) before it becomes visible.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{BatchOutcome, Rejection, ResourceRequest};
use crate::store::{MemoryStore, SharedStore};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the in-memory entities, the handle to the
/// backing store and the receiver end of the channel.
///
/// **Concurrency Model**:
/// Each actor processes its own messages *sequentially*. Two clients racing on the same entity are
/// therefore ordered by the mailbox, and a [`ResourceRequest::BatchAction`] is atomic with respect
/// to every other request without any `Mutex`.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` (in-memory) or `ResourceActor::with_store()` (restored).
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// # Write Path
///
/// * **Create**: allocate id → `from_create_params` → `on_create` → `store.put` → insert.
/// * **Update**: clone → `on_update` → `store.put` → replace.
/// * **Delete**: `on_delete` → `store.delete` → remove.
/// * **Action**: clone → `handle_action` → `store.put` (skipped when read-only) → replace.
/// * **BatchAction**: clone every target → `handle_action` on each → if all accepted, one
///   `store.put` for all of them → replace. Any refusal discards every clone.
///
/// A failed store write is reported as [`FrameworkError::Store`] and leaves memory unchanged.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    entities: HashMap<T::Id, T>,
    store: SharedStore<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates an empty actor backed by a fresh [`MemoryStore`], plus its client.
    ///
    /// `buffer_size` is the mailbox capacity; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            entities: HashMap::new(),
            store: Arc::new(MemoryStore::<T::Id, T>::new()),
            next_id: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Creates an actor whose state is loaded from `store`.
    ///
    /// The id counter resumes after the highest persisted id, so restored and newly created
    /// entities never collide.
    pub async fn with_store(
        buffer_size: usize,
        store: SharedStore<T::Id, T>,
    ) -> Result<(Self, ResourceClient<T>), FrameworkError> {
        let records = store.load().await?;
        let highest: Option<u32> = records.iter().map(|(id, _)| id.clone().into()).max();

        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            entities: records.into_iter().collect(),
            store,
            next_id: highest.map_or(1, |max| max + 1),
        };
        Ok((actor, ResourceClient::new(sender)))
    }

    /// Entities currently held, in id order. Useful for reconciling other components at startup.
    pub fn snapshot(&self) -> Vec<T> {
        let mut items: Vec<T> = self.entities.values().cloned().collect();
        items.sort_by_key(|item| -> u32 { item.id().into() });
        items
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This allows entities
    /// to access external dependencies (like other clients) that were created *after*
    /// the actor was instantiated but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Order" instead of "gallery_checkout::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, size = self.entities.len(), "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.store.put(vec![(id.clone(), item.clone())]).await {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.entities.insert(id.clone(), item);
                    info!(entity_type, %id, size = self.entities.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.entities.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.entities.len(), "List");
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.entities.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut staged = current.clone();
                    if let Err(e) = staged.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.store.put(vec![(id.clone(), staged.clone())]).await {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.entities.insert(id.clone(), staged.clone());
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(staged));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.entities.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.store.delete(id.clone()).await {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.entities.remove(&id);
                    info!(entity_type, %id, size = self.entities.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(current) = self.entities.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let read_only = T::is_read_only(&action);
                    let mut staged = current.clone();
                    let result = match staged.handle_action(action, &context).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if !read_only {
                        if let Err(e) = self.store.put(vec![(id.clone(), staged.clone())]).await {
                            warn!(entity_type, %id, error = %e, "Persist failed");
                            let _ = respond_to.send(Err(e.into()));
                            continue;
                        }
                        self.entities.insert(id.clone(), staged);
                    }
                    info!(entity_type, %id, "Action ok");
                    let _ = respond_to.send(Ok(result));
                }
                ResourceRequest::BatchAction {
                    ids,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, ?ids, ?action, "BatchAction");
                    let outcome = self.apply_batch(ids, action, &context).await;
                    match &outcome {
                        Ok(BatchOutcome::Applied(results)) => {
                            info!(entity_type, count = results.len(), "Batch applied")
                        }
                        Ok(BatchOutcome::Rejected(rejections)) => {
                            warn!(entity_type, ?rejections, "Batch rejected")
                        }
                        Err(e) => warn!(entity_type, error = %e, "Batch persist failed"),
                    }
                    let _ = respond_to.send(outcome);
                }
            }
        }

        info!(entity_type, size = self.entities.len(), "Shutdown");
    }

    /// Applies `action` to every id on staged clones and commits only if all of them accept it.
    async fn apply_batch(
        &mut self,
        ids: Vec<T::Id>,
        action: T::Action,
        context: &T::Context,
    ) -> Result<BatchOutcome<T>, FrameworkError> {
        let read_only = T::is_read_only(&action);
        let mut staged: HashMap<T::Id, T> = HashMap::with_capacity(ids.len());
        let mut results = Vec::with_capacity(ids.len());
        let mut rejections = Vec::new();

        for id in ids {
            // Repeated ids see the staged copy, not the committed one.
            let entity = match staged.entry(id.clone()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => match self.entities.get(&id) {
                    Some(current) => slot.insert(current.clone()),
                    None => {
                        rejections.push(Rejection::NotFound(id));
                        continue;
                    }
                },
            };
            match entity.handle_action(action.clone(), context).await {
                Ok(result) => results.push((id, result)),
                Err(e) => rejections.push(Rejection::Refused {
                    id,
                    reason: e.to_string(),
                }),
            }
        }

        if !rejections.is_empty() {
            return Ok(BatchOutcome::Rejected(rejections));
        }

        if !read_only {
            let records = staged
                .iter()
                .map(|(id, item)| (id.clone(), item.clone()))
                .collect();
            self.store.put(records).await?;
            self.entities.extend(staged);
        }
        Ok(BatchOutcome::Applied(results))
    }
}
