// ── Catalog loading with store-to-local fallback ──

use std::future::Future;

use tracing::{info, warn};

use super::{Catalog, CatalogData, CatalogError, LocalCatalog};
use crate::config::CatalogMode;
use crate::source::ConfigStore;

/// Anything that can produce raw catalog data.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<CatalogData, CatalogError>> + Send;

    /// Short human description for logs.
    fn describe(&self) -> String;
}

impl CatalogSource for LocalCatalog {
    async fn load(&self) -> Result<CatalogData, CatalogError> {
        self.read()
    }

    fn describe(&self) -> String {
        format!("local dataset {}", self.dir().display())
    }
}

/// Catalog kept in a configuration store.
#[derive(Debug)]
pub struct StoreCatalog<'a, S> {
    store: &'a S,
}

impl<'a, S: ConfigStore> StoreCatalog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: ConfigStore> CatalogSource for StoreCatalog<'_, S> {
    async fn load(&self) -> Result<CatalogData, CatalogError> {
        Ok(self.store.catalog().await?)
    }

    fn describe(&self) -> String {
        "configuration store".into()
    }
}

/// Build a catalog snapshot for `mode`.
///
/// In store mode any failure to load or validate the remote catalog falls
/// back to `local`; the snapshot then reports `CatalogMode::Local` and
/// carries the reason.
pub async fn load_catalog<R, L>(
    mode: CatalogMode,
    remote: &R,
    local: &L,
) -> Result<Catalog, CatalogError>
where
    R: CatalogSource,
    L: CatalogSource,
{
    if mode == CatalogMode::Local {
        info!(source = %local.describe(), "loading catalog");
        return Catalog::from_data(local.load().await?, CatalogMode::Local);
    }

    info!(source = %remote.describe(), "loading catalog");
    match remote
        .load()
        .await
        .and_then(|data| Catalog::from_data(data, CatalogMode::Store))
    {
        Ok(catalog) => Ok(catalog),
        Err(e) => {
            warn!(
                source = %remote.describe(),
                error = %e,
                "catalog unavailable, falling back to {}",
                local.describe()
            );
            let catalog = Catalog::from_data(local.load().await?, CatalogMode::Local)?;
            Ok(catalog.with_fallback(CatalogMode::Store, e.to_string()))
        }
    }
}
