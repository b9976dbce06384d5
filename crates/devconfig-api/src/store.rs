// Configuration-store client.
//
// Endpoints (all relative to the store base URL):
//   GET objects/{obj_type}        -> Page<StoreObject>
//   GET configs/{obj_type}/{id}   -> StoreConfig
//   GET catalog                   -> CatalogDocument

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::http::JsonClient;
use crate::models::{CatalogDocument, Page, StoreConfig, StoreObject};
use crate::transport::TransportConfig;

/// Async client for the device configuration store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    inner: JsonClient,
}

impl StoreClient {
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

    /// List every object of one type.
    pub async fn list_objects(&self, obj_type: &str) -> Result<Vec<StoreObject>, Error> {
        let url = self.inner.url(&format!("objects/{obj_type}"))?;
        debug!(obj_type, "listing store objects");
        let page: Page<StoreObject> = self.inner.get(url).await?;
        Ok(page.data)
    }

    /// Scan the objects of one type for the one whose `id_field` equals
    /// `value`. Comparison is on the textual form of the stored value.
    pub async fn find_object(
        &self,
        obj_type: &str,
        id_field: &str,
        value: &str,
    ) -> Result<Option<StoreObject>, Error> {
        let objects = self.list_objects(obj_type).await?;
        debug!(obj_type, id_field, value, count = objects.len(), "scanning objects");
        Ok(objects.into_iter().find(|obj| {
            obj.fields
                .get(id_field)
                .is_some_and(|v| scalar_text(v) == value)
        }))
    }

    /// Fetch one configuration record by id.
    pub async fn get_config(&self, obj_type: &str, id: u64) -> Result<StoreConfig, Error> {
        let url = self.inner.url(&format!("configs/{obj_type}/{id}"))?;
        self.inner.get(url).await
    }

    /// Fetch the devconfig catalog kept in the store.
    pub async fn catalog(&self) -> Result<CatalogDocument, Error> {
        let url = self.inner.url("catalog")?;
        self.inner.get_with_params(url, &[("format", "devconfig")]).await
    }
}

/// Textual form of a scalar JSON value, as a control point displays it.
///
/// Integral floats print without a fraction (`12.0` -> `"12"`) and booleans
/// as `0`/`1`, so stored identities compare equal to live readings.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => i64::from(*b).to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_f64().map(|f| f.to_string()))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalar_text_prints_integral_floats_like_readings() {
        assert_eq!(scalar_text(&json!(12.0)), "12");
        assert_eq!(scalar_text(&json!(12.5)), "12.5");
        assert_eq!(scalar_text(&json!(7)), "7");
        assert_eq!(scalar_text(&json!(true)), "1");
        assert_eq!(scalar_text(&json!(null)), "");
        assert_eq!(scalar_text(&json!("SN1")), "SN1");
    }
}
