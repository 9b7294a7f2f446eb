//! Store settings (single row, upserted)

use parking_lot::RwLock;
use std::sync::Arc;

use shared::error::AppError;
use shared::models::{StoreSettings, StoreSettingsUpdate};
use shared::util::{now_millis, snowflake_id};

use crate::backend::Backend;
use crate::db::Repository;
use crate::error::ServiceResult;

fn validate(update: &StoreSettingsUpdate) -> Result<(), AppError> {
    if update
        .store_name
        .as_deref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(AppError::validation("store_name must not be empty"));
    }
    if update
        .currency
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        return Err(AppError::validation("currency must not be empty"));
    }
    let non_negative = |v: f64| v.is_finite() && v >= 0.0;
    if update.shipping_cost.is_some_and(|v| !non_negative(v)) {
        return Err(AppError::validation("shipping_cost must not be negative"));
    }
    if update
        .free_shipping_threshold
        .is_some_and(|v| !non_negative(v))
    {
        return Err(AppError::validation("free_shipping_threshold must not be negative"));
    }
    Ok(())
}

pub struct SettingsService {
    repo: Repository<StoreSettings>,
    current: RwLock<Option<StoreSettings>>,
}

impl SettingsService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            repo: Repository::new(backend),
            current: RwLock::new(None),
        }
    }

    pub async fn warmup(&self) -> ServiceResult<()> {
        let mut rows = self.repo.find_all().await?;
        rows.sort_by_key(|s| s.id);
        *self.current.write() = rows.into_iter().next();
        Ok(())
    }

    /// Stored settings, or the defaults when none were saved yet
    pub fn get(&self) -> StoreSettings {
        self.current
            .read()
            .clone()
            .unwrap_or_else(|| StoreSettings::initial(0, now_millis()))
    }

    pub async fn update(&self, update: StoreSettingsUpdate) -> ServiceResult<StoreSettings> {
        validate(&update)?;

        let existing = self.current.read().clone();
        let saved = match existing {
            Some(mut settings) => {
                update.apply_to(&mut settings);
                settings.updated_at = now_millis();
                self.repo.update(&settings).await?
            }
            None => {
                let mut settings = StoreSettings::initial(snowflake_id(), now_millis());
                update.apply_to(&mut settings);
                self.repo.insert(&settings).await?
            }
        };

        *self.current.write() = Some(saved.clone());
        tracing::info!(store_name = %saved.store_name, "Store settings saved");
        Ok(saved)
    }
}
