//! # Order Access Guard
//!
//! An order, and the invoice derived from it, is visible to the buyer who placed it and to
//! administrators. Nobody else.

use crate::model::{Order, Role, User, UserId};

/// The authenticated caller of a checkout operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
}

impl Requester {
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// True iff `requester` owns `order` or is an administrator.
pub fn authorize(requester: &Requester, order: &Order) -> bool {
    requester.is_admin() || order.user_id == requester.user_id
}
