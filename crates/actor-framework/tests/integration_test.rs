use actor_framework::mock::FlakyStore;
use actor_framework::{
    ActorEntity, BatchOutcome, FrameworkError, MemoryStore, Rejection, ResourceActor,
    SharedStore,
};
use async_trait::async_trait;
use std::sync::Arc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Ticket {
    id: u32,
    venue: String,
    holder: Option<String>,
}

#[derive(Debug)]
struct TicketCreate {
    venue: String,
}

#[derive(Debug)]
struct TicketUpdate {
    venue: Option<String>,
}

#[derive(Debug, Clone)]
enum TicketAction {
    Claim(String),
    Peek,
}

#[derive(Debug, thiserror::Error)]
enum TicketError {
    #[error("Ticket {0} already held")]
    AlreadyHeld(u32),
    #[error("Venue must not be empty")]
    EmptyVenue,
}

#[async_trait]
impl ActorEntity for Ticket {
    type Id = u32;
    type Create = TicketCreate;
    type Update = TicketUpdate;
    type Action = TicketAction;
    type ActionResult = Option<String>;
    type Context = ();
    type Error = TicketError;

    fn id(&self) -> u32 {
        self.id
    }

    fn from_create_params(id: u32, params: TicketCreate) -> Result<Self, Self::Error> {
        if params.venue.trim().is_empty() {
            return Err(TicketError::EmptyVenue);
        }
        Ok(Self {
            id,
            venue: params.venue,
            holder: None,
        })
    }

    async fn on_update(&mut self, update: TicketUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(venue) = update.venue {
            self.venue = venue;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: TicketAction,
        _ctx: &(),
    ) -> Result<Option<String>, Self::Error> {
        match action {
            TicketAction::Claim(holder) => {
                if self.holder.is_some() {
                    return Err(TicketError::AlreadyHeld(self.id));
                }
                self.holder = Some(holder.clone());
                Ok(Some(holder))
            }
            TicketAction::Peek => Ok(self.holder.clone()),
        }
    }

    fn is_read_only(action: &TicketAction) -> bool {
        matches!(action, TicketAction::Peek)
    }
}

fn ticket(venue: &str) -> TicketCreate {
    TicketCreate {
        venue: venue.to_string(),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(ticket("Hall A")).await.unwrap();
    assert_eq!(id, 1);

    let held = client
        .perform_action(id, TicketAction::Claim("alice".into()))
        .await
        .unwrap();
    assert_eq!(held.as_deref(), Some("alice"));

    let second = client
        .perform_action(id, TicketAction::Claim("bob".into()))
        .await;
    assert!(matches!(second, Err(FrameworkError::EntityError(_))));

    let updated = client
        .update(
            id,
            TicketUpdate {
                venue: Some("Hall B".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.venue, "Hall B");
    assert_eq!(updated.holder.as_deref(), Some("alice"));

    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
    assert!(matches!(
        client.delete(id).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_create_does_not_store_anything() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    assert!(client.create(ticket("  ")).await.is_err());
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    for venue in ["A", "B", "C"] {
        client.create(ticket(venue)).await.unwrap();
    }

    let venues: Vec<String> = client
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.venue)
        .collect();
    assert_eq!(venues, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_batch_applies_to_every_entity() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    let a = client.create(ticket("A")).await.unwrap();
    let b = client.create(ticket("B")).await.unwrap();

    let outcome = client
        .perform_batch(vec![a, b], TicketAction::Claim("carol".into()))
        .await
        .unwrap();
    match outcome {
        BatchOutcome::Applied(results) => {
            let ids: Vec<u32> = results.iter().map(|(id, _)| *id).collect();
            assert_eq!(ids, vec![a, b]);
        }
        BatchOutcome::Rejected(r) => panic!("unexpected rejection: {:?}", r),
    }

    for id in [a, b] {
        let t = client.get(id).await.unwrap().unwrap();
        assert_eq!(t.holder.as_deref(), Some("carol"));
    }
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    let free = client.create(ticket("A")).await.unwrap();
    let held = client.create(ticket("B")).await.unwrap();
    client
        .perform_action(held, TicketAction::Claim("dave".into()))
        .await
        .unwrap();

    let outcome = client
        .perform_batch(vec![free, held, 99], TicketAction::Claim("erin".into()))
        .await
        .unwrap();

    match outcome {
        BatchOutcome::Rejected(rejections) => {
            assert_eq!(rejections.len(), 2);
            assert!(matches!(&rejections[0], Rejection::Refused { id, .. } if *id == held));
            assert_eq!(rejections[1], Rejection::NotFound(99));
        }
        BatchOutcome::Applied(_) => panic!("batch must be rejected"),
    }

    // The free ticket was claimed only on a staged copy.
    let untouched = client.get(free).await.unwrap().unwrap();
    assert!(untouched.holder.is_none());
}

#[tokio::test]
async fn test_batch_sees_repeated_ids_as_staged() {
    let (actor, client) = ResourceActor::<Ticket>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(ticket("A")).await.unwrap();
    let outcome = client
        .perform_batch(vec![id, id], TicketAction::Claim("frank".into()))
        .await
        .unwrap();

    assert!(matches!(outcome, BatchOutcome::Rejected(r) if r.len() == 1));
    assert!(client.get(id).await.unwrap().unwrap().holder.is_none());
}

#[tokio::test]
async fn test_failed_write_leaves_state_unchanged() {
    let store = FlakyStore::<u32, Ticket>::new();
    let shared: SharedStore<u32, Ticket> = Arc::new(store.clone());
    let (actor, client) = ResourceActor::<Ticket>::with_store(10, shared)
        .await
        .unwrap();
    tokio::spawn(actor.run(()));

    let a = client.create(ticket("A")).await.unwrap();
    let b = client.create(ticket("B")).await.unwrap();

    store.fail_writes(true);

    let single = client
        .perform_action(a, TicketAction::Claim("gina".into()))
        .await;
    assert!(matches!(&single, Err(e) if e.is_store_failure()));

    let batch = client
        .perform_batch(vec![a, b], TicketAction::Claim("gina".into()))
        .await;
    assert!(matches!(&batch, Err(e) if e.is_store_failure()));

    // Read-only actions never touch the store.
    let peek = client.perform_action(a, TicketAction::Peek).await.unwrap();
    assert!(peek.is_none());

    assert!(client.create(ticket("C")).await.is_err());

    store.fail_writes(false);
    for t in client.list().await.unwrap() {
        assert!(t.holder.is_none());
    }
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn test_actor_restores_from_store() {
    let store = MemoryStore::<u32, Ticket>::new();

    {
        let (actor, client) = ResourceActor::<Ticket>::with_store(10, Arc::new(store.clone()))
            .await
            .unwrap();
        let handle = tokio::spawn(actor.run(()));

        let a = client.create(ticket("A")).await.unwrap();
        client.create(ticket("B")).await.unwrap();
        client
            .perform_action(a, TicketAction::Claim("hank".into()))
            .await
            .unwrap();

        drop(client);
        handle.await.unwrap();
    }

    let (actor, client) = ResourceActor::<Ticket>::with_store(10, Arc::new(store.clone()))
        .await
        .unwrap();
    assert_eq!(actor.snapshot().len(), 2);
    tokio::spawn(actor.run(()));

    let restored = client.get(1).await.unwrap().unwrap();
    assert_eq!(restored.holder.as_deref(), Some("hank"));

    // Ids continue after the highest restored one.
    let next = client.create(ticket("C")).await.unwrap();
    assert_eq!(next, 3);
}
