// rabbitsync-api: Async Rust client for the RabbitMQ management HTTP API

pub mod client;
pub mod error;
pub mod hash;
pub mod models;
pub mod transport;

mod exchanges;
mod permissions;
mod topic_permissions;
mod users;
mod vhosts;

pub use client::ManagementClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
