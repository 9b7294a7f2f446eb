//! Application state shared by every handler

use std::sync::Arc;

use crate::backend::{Backend, MemoryBackend, RemoteBackend, seed::seed_fallback_data};
use crate::config::Config;
use crate::error::{BoxError, ServiceResult};
use crate::services::{
    CatalogService, LookupService, LookupTable, OrderService, PreferenceStore, SettingsService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn Backend>,
    pub catalog: Arc<CatalogService>,
    pub lookups: Arc<LookupService>,
    pub orders: Arc<OrderService>,
    pub settings: Arc<SettingsService>,
    pub preferences: Arc<PreferenceStore>,
}

impl AppState {
    /// Pick the backend from the configuration and load every read model
    ///
    /// With `BACKEND_URL` set the hosted backend is used; otherwise an
    /// in-memory backend, seeded with the fallback data set when enabled.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let backend: Arc<dyn Backend> = match &config.backend_url {
            Some(url) => {
                tracing::info!(url = %url, "Using hosted backend");
                Arc::new(RemoteBackend::new(
                    url,
                    &config.backend_service_key,
                    &config.storage_bucket,
                    config.request_timeout,
                )?)
            }
            None => {
                tracing::warn!("BACKEND_URL not set, using in-memory backend");
                let memory = MemoryBackend::new(
                    &config.storage_bucket,
                    &config.dev_admin_email,
                    &config.dev_admin_password,
                );
                if config.seed_fallback_data {
                    seed_fallback_data(&memory).await?;
                }
                Arc::new(memory)
            }
        };

        let state = Self::with_backend(config.clone(), backend);
        state.warmup().await?;
        Ok(state)
    }

    /// Wire the services over an existing backend (read models start empty)
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        let catalog = Arc::new(CatalogService::new(backend.clone()));
        let statuses = Arc::new(LookupTable::new(backend.clone()));
        let orders = Arc::new(OrderService::new(
            backend.clone(),
            catalog.clone(),
            statuses.clone(),
            config.reject_oversell,
        ));
        let lookups = Arc::new(LookupService::new(
            backend.clone(),
            statuses,
            catalog.clone(),
            orders.clone(),
        ));
        let settings = Arc::new(SettingsService::new(backend.clone()));
        let preferences = Arc::new(PreferenceStore::load(config.preferences_path()));

        Self {
            config: Arc::new(config),
            backend,
            catalog,
            lookups,
            orders,
            settings,
            preferences,
        }
    }

    /// Load every cache from the backend
    pub async fn warmup(&self) -> ServiceResult<()> {
        self.catalog.warmup().await?;
        self.lookups.warmup().await?;
        self.orders.warmup().await?;
        self.settings.warmup().await?;
        tracing::info!(backend = ?self.backend.kind(), "Read models loaded");
        Ok(())
    }
}
