//! # Generic Messages
//!
//! The message types exchanged between a [`ResourceClient`](crate::ResourceClient) and a
//! [`ResourceActor`](crate::ResourceActor).

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// # The CRUD Pattern
/// The variants map to standard **CRUD** operations plus two extension points:
///
/// - **Create / Get / List / Update / Delete**: lifecycle and retrieval.
/// - **Action**: a custom [`ActorEntity::Action`] against one entity.
/// - **BatchAction**: the same action against several entities, all-or-nothing.
///
/// Because the actor drains its mailbox one message at a time, a `BatchAction` is observed by every
/// other request either completely before or completely after it.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    BatchAction {
        ids: Vec<T::Id>,
        action: T::Action,
        respond_to: Response<BatchOutcome<T>>,
    },
}

/// Why one entity in a batch refused the action.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection<Id> {
    /// No entity is stored under this id.
    NotFound(Id),
    /// The entity's `handle_action` returned an error.
    Refused { id: Id, reason: String },
}

impl<Id> Rejection<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Rejection::NotFound(id) => id,
            Rejection::Refused { id, .. } => id,
        }
    }
}

/// Result of a [`ResourceRequest::BatchAction`].
///
/// `Rejected` means nothing was changed: every entity is exactly as it was before the request.
#[derive(Debug)]
pub enum BatchOutcome<T: ActorEntity> {
    /// Every entity accepted the action; results are in request order.
    Applied(Vec<(T::Id, T::ActionResult)>),
    /// At least one entity refused; lists every refusal, in request order.
    Rejected(Vec<Rejection<T::Id>>),
}
