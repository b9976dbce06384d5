// Control-point gateway client.
//
// The gateway exposes one read endpoint: `GET points/{address}`, where
// `address` is the full point name including the field suffix.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::http::JsonClient;
use crate::models::PointReading;
use crate::transport::TransportConfig;

/// Async client for the control-point HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    inner: JsonClient,
}

impl GatewayClient {
    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            inner: JsonClient::new(http, base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Read a single control point.
    ///
    /// A reading the gateway reports as disconnected is returned as
    /// [`Error::Disconnected`], so callers see one connection-failure signal.
    pub async fn read(&self, address: &str) -> Result<PointReading, Error> {
        let mut url = self.inner.url("points")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(address);

        let reading: PointReading = self.inner.get(url).await?;
        if !reading.connected {
            debug!(address, "gateway reports point disconnected");
            return Err(Error::Disconnected {
                address: address.to_owned(),
            });
        }
        Ok(reading)
    }
}
