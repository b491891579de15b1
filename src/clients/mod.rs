//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).

pub mod catalog_client;
pub mod order_client;
pub mod user_client;

pub use catalog_client::*;
pub use order_client::*;
pub use user_client::*;
