//! # Mock Framework & Testing Guide
//!
//! Test doubles for both halves of an actor:
//!
//! - [`MockClient`] stands in for a running `ResourceActor`: it answers requests from a queue of
//!   expectations, so client-side orchestration can be tested without spawning real actors.
//! - [`FlakyStore`] stands in for a storage backend that can be told to fail, so the write path of
//!   a real actor can be tested against infrastructure faults.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Use Case** | Unit testing logic *around* the client | Testing the actor itself or full system |
//! | **Error Injection** | Easy (`return_err`) | [`FlakyStore`] for store faults |
//!
//! ## Testing Strategies
//!
//! - **Pattern 0: Client logic test.** Wrap `MockClient::client()` in your typed client and assert
//!   on the calls it makes.
//! - **Pattern 1: Single actor test.** Spawn one `ResourceActor` and drive it through its client.
//! - **Pattern 2: Orchestration with mocked dependencies.** Real service, mocked neighbours
//!   (see `tests/checkout_mocked_test.rs` in the `gallery-checkout` crate).
//! - **Pattern 3: Full system.** Every actor real, optionally with a `FlakyStore` behind one of
//!   them to exercise compensation paths.
//!
//! ## Testing Failure Scenarios
//!
//! ```rust,ignore
//! let mut mock = MockClient::<User>::new();
//! mock.expect_get(UserId(1)).return_err(FrameworkError::ActorClosed);
//!
//! let result = mock.client().get(UserId(1)).await;
//! assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//! ```

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{BatchOutcome, ResourceRequest};
use crate::store::{MemoryStore, Store, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the canned response to send back.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Action {
        response: Result<T::ActionResult, FrameworkError>,
    },
    Batch {
        response: Result<BatchOutcome<T>, FrameworkError>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Get { .. } => "Get",
            Expectation::List { .. } => "List",
            Expectation::Create { .. } => "Create",
            Expectation::Action { .. } => "Action",
            Expectation::Batch { .. } => "BatchAction",
        }
    }
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Requests are matched against expectations strictly in order; an unexpected request panics the
/// mock task, which surfaces in the test as [`FrameworkError::ActorDropped`].
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<User>::new();
/// mock.expect_get(UserId(1)).return_ok(Some(user));
/// mock.expect_create().return_ok(UserId(2));
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = Arc::clone(&expectations);

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { respond_to, .. },
                        Some(Expectation::Action { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::BatchAction { respond_to, .. },
                        Some(Expectation::Batch { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (request, expectation) => {
                        panic!(
                            "Unexpected request {:?}; next expectation was {}",
                            std::mem::discriminant(&request),
                            expectation.as_ref().map_or("<none>", Expectation::name)
                        );
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, _id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Get { response })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::List { response })
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Create { response })
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self, _id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Action { response })
    }

    /// Expects a `batch action` operation.
    pub fn expect_batch(&mut self) -> ExpectationBuilder<T, BatchOutcome<T>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Batch { response })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder returned by the `expect_*` methods; finish it with `return_ok` or `return_err`.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Expectations<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: &Expectations<T>,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> Self {
        Self {
            expectations: Arc::clone(expectations),
            wrap,
        }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.expectations.lock().push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// CHANNEL-LEVEL HELPERS
// =============================================================================

/// Creates a client whose requests land on a receiver the test controls.
///
/// Useful when the test must inspect the request payload (ids, action) before answering.
/// For canned responses prefer [`MockClient`].
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    tokio::sync::oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a BatchAction request
pub async fn expect_batch<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    Vec<T::Id>,
    T::Action,
    tokio::sync::oneshot::Sender<Result<BatchOutcome<T>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::BatchAction {
            ids,
            action,
            respond_to,
        }) => Some((ids, action, respond_to)),
        _ => None,
    }
}

// =============================================================================
// FAULT-INJECTING STORE
// =============================================================================

/// A [`MemoryStore`] whose writes can be switched to fail.
///
/// Clones share both the records and the failure switch, so a test can keep one handle while the
/// actor owns another.
pub struct FlakyStore<K, V> {
    inner: MemoryStore<K, V>,
    failing: Arc<AtomicBool>,
}

impl<K, V> FlakyStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// When `true`, every `put` and `delete` fails with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The records that were successfully written.
    pub fn records(&self) -> std::collections::HashMap<K, V> {
        self.inner.records()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl<K, V> Default for FlakyStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for FlakyStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            failing: Arc::clone(&self.failing),
        }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for FlakyStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<(K, V)>, StoreError> {
        self.inner.load().await
    }

    async fn put(&self, records: Vec<(K, V)>) -> Result<(), StoreError> {
        self.check()?;
        self.inner.put(records).await
    }

    async fn delete(&self, key: K) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(key).await
    }
}
