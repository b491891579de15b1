//! Domain types shared by the actors, clients and checkout service.

pub mod catalog;
pub mod invoice;
pub mod order;
pub mod user;

pub use catalog::*;
pub use invoice::*;
pub use order::*;
pub use user::*;
