//! Async HTTP clients for the two remote collaborators of devconfig:
//!
//! - **[`GatewayClient`]** reads control points through an HTTP gateway.
//! - **[`StoreClient`]** looks up objects, configurations and the devconfig
//!   catalog in the configuration store.
//!
//! Both share [`TransportConfig`] for TLS, timeout and token handling.

pub mod error;
pub mod gateway;
mod http;
pub mod models;
pub mod store;
pub mod transport;

pub use error::Error;
pub use gateway::GatewayClient;
pub use store::{StoreClient, scalar_text};
pub use transport::{TlsMode, TransportConfig};
