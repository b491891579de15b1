//! # User Actor
//!
//! Registered buyers and administrators. The simplest actor in the system: no context, no
//! custom actions. Checkout uses it to confirm the buyer exists and invoices use it for the
//! customer's name and email.
//!
//! ## Usage
//!
//! ```rust
//! use gallery_checkout::user_actor;
//! use gallery_checkout::model::UserCreate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = user_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_user(UserCreate::customer("alice", "alice@example.com").named("Alice", "Liddell"))
//!         .await?;
//!     let alice = client.find_user(id).await?;
//!     assert_eq!(alice.full_name(), "Alice Liddell");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::{User, UserId};
use actor_framework::{FrameworkError, ResourceActor, SharedStore};

/// Creates a new in-memory User actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(capacity);
    (actor, UserClient::new(generic_client))
}

/// Creates a User actor restored from `store`.
pub async fn with_store(
    capacity: usize,
    store: SharedStore<UserId, User>,
) -> Result<(ResourceActor<User>, UserClient), FrameworkError> {
    let (actor, generic_client) = ResourceActor::with_store(capacity, store).await?;
    Ok((actor, UserClient::new(generic_client)))
}
