//! Runtime choice of point transport and configuration store.
//!
//! The engine is generic over both; the CLI picks the concrete backend from
//! the resolved profile, so these enums forward to whichever one is live.

use devconfig_api::{GatewayClient, StoreClient, TransportConfig};
use devconfig_core::{
    CatalogData, ConfigStore, MemoryPoints, MemoryStore, NoStore, ObjectRecord, PointTransport,
    PointValue, StoreError, TransportError,
};
use tracing::debug;

use crate::config::Resolved;
use crate::error::CliError;

/// Where control-point values come from.
#[derive(Debug)]
pub enum Points {
    Gateway(GatewayClient),
    Snapshot(MemoryPoints),
    Unconfigured,
}

impl Points {
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }
}

impl PointTransport for Points {
    async fn get(&self, address: &str) -> Result<PointValue, TransportError> {
        match self {
            Self::Gateway(client) => client.get(address).await,
            Self::Snapshot(points) => points.get(address).await,
            Self::Unconfigured => Err(TransportError::Connection {
                address: address.to_owned(),
                reason: "no control-point gateway configured".into(),
            }),
        }
    }
}

/// Where stored records and the remote catalog come from.
#[derive(Debug)]
pub enum Store {
    Client(StoreClient),
    Snapshot(MemoryStore),
    Unconfigured(NoStore),
}

impl ConfigStore for Store {
    async fn find_object_by_identity(
        &self,
        device_type: &str,
        identity_key: &str,
        value: &str,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        match self {
            Self::Client(client) => {
                client
                    .find_object_by_identity(device_type, identity_key, value)
                    .await
            }
            Self::Snapshot(store) => {
                store
                    .find_object_by_identity(device_type, identity_key, value)
                    .await
            }
            Self::Unconfigured(none) => {
                none.find_object_by_identity(device_type, identity_key, value)
                    .await
            }
        }
    }

    async fn catalog(&self) -> Result<CatalogData, StoreError> {
        match self {
            Self::Client(client) => ConfigStore::catalog(client).await,
            Self::Snapshot(store) => store.catalog().await,
            Self::Unconfigured(none) => none.catalog().await,
        }
    }
}

/// Build both backends for a resolved profile.
///
/// Snapshot files win over URLs so a profile can be switched offline with a
/// single flag.
pub fn connect(
    resolved: &Resolved,
    transport: &TransportConfig,
) -> Result<(Points, Store), CliError> {
    let profile = &resolved.profile;

    let points = if let Some(path) = &profile.points_file {
        debug!(path = %path.display(), "reading control points from snapshot");
        Points::Snapshot(MemoryPoints::from_json_file(path)?)
    } else if let Some(url) = profile.gateway_url()? {
        Points::Gateway(GatewayClient::new(url, transport)?)
    } else {
        Points::Unconfigured
    };

    let store = if let Some(path) = &profile.store_file {
        debug!(path = %path.display(), "reading stored records from dump");
        Store::Snapshot(MemoryStore::from_json_file(path)?)
    } else if let Some(url) = profile.store_url()? {
        Store::Client(StoreClient::new(url, transport)?)
    } else {
        Store::Unconfigured(NoStore)
    };

    Ok((points, store))
}
