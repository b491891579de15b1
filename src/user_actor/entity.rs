//! [`ActorEntity`] implementation for [`User`].
//!
//! Users have no custom actions; the actor only stores them and answers lookups.

use super::UserError;
use crate::model::{User, UserCreate, UserId};
use actor_framework::ActorEntity;
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn id(&self) -> UserId {
        self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// Username and email must not be blank.
    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        if params.username.trim().is_empty() {
            return Err(UserError::ValidationError("username is required".into()));
        }
        if params.email.trim().is_empty() {
            return Err(UserError::ValidationError("email is required".into()));
        }
        Ok(Self {
            id,
            username: params.username,
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            role: params.role,
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
