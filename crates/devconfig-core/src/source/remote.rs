// ── HTTP-backed collaborators ──
//
// Bridges the devconfig-api clients onto the collaborator traits.

use devconfig_api::{GatewayClient, StoreClient};
use tracing::debug;

use super::{ConfigStore, ObjectRecord, PointTransport, StoreError, TransportError};
use crate::catalog::CatalogData;
use crate::convert;
use crate::model::PointValue;

impl From<devconfig_api::Error> for StoreError {
    fn from(err: devconfig_api::Error) -> Self {
        use devconfig_api::Error as E;
        if err.is_connection() {
            return Self::Unavailable {
                reason: err.to_string(),
            };
        }
        match err {
            E::Unauthorized { message } => Self::Rejected { message },
            e @ (E::NotFound { .. } | E::Status { .. }) => Self::Rejected {
                message: e.to_string(),
            },
            E::Deserialization { message, .. } => Self::Malformed { message },
            other => Self::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}

impl PointTransport for GatewayClient {
    async fn get(&self, address: &str) -> Result<PointValue, TransportError> {
        match self.read(address).await {
            Ok(reading) => Ok(PointValue::from(reading.value)),
            Err(e) => {
                debug!(address, error = %e, "gateway read failed");
                Err(TransportError::Connection {
                    address: address.to_owned(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl ConfigStore for StoreClient {
    async fn find_object_by_identity(
        &self,
        device_type: &str,
        identity_key: &str,
        value: &str,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        let Some(object) = self.find_object(device_type, identity_key, value).await? else {
            return Ok(None);
        };
        let config = match object.config {
            Some(id) => Some(self.get_config(device_type, id).await?),
            None => None,
        };
        Ok(Some(convert::object_record(object, config)))
    }

    async fn catalog(&self) -> Result<CatalogData, StoreError> {
        let document = StoreClient::catalog(self).await?;
        Ok(convert::catalog_data(document))
    }
}
