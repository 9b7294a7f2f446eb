//! Store Settings Model (single row)

use serde::{Deserialize, Serialize};

/// Store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub id: i64,
    pub store_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub shipping_cost: f64,
    pub free_shipping_threshold: Option<f64>,
    pub updated_at: i64,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl StoreSettings {
    pub fn initial(id: i64, now: i64) -> Self {
        Self {
            id,
            store_name: "Mi Tienda".to_string(),
            contact_email: None,
            contact_phone: None,
            whatsapp: None,
            currency: default_currency(),
            shipping_cost: 0.0,
            free_shipping_threshold: None,
            updated_at: now,
        }
    }
}

/// Update store settings payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettingsUpdate {
    pub store_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp: Option<String>,
    pub currency: Option<String>,
    pub shipping_cost: Option<f64>,
    pub free_shipping_threshold: Option<f64>,
}

impl StoreSettingsUpdate {
    pub fn apply_to(&self, settings: &mut StoreSettings) {
        if let Some(v) = &self.store_name {
            settings.store_name = v.trim().to_string();
        }
        if let Some(v) = &self.contact_email {
            settings.contact_email = crate::util::non_blank(Some(v.clone()));
        }
        if let Some(v) = &self.contact_phone {
            settings.contact_phone = crate::util::non_blank(Some(v.clone()));
        }
        if let Some(v) = &self.whatsapp {
            settings.whatsapp = crate::util::non_blank(Some(v.clone()));
        }
        if let Some(v) = &self.currency {
            settings.currency = v.trim().to_uppercase();
        }
        if let Some(v) = self.shipping_cost {
            settings.shipping_cost = v;
        }
        if let Some(v) = self.free_shipping_threshold {
            settings.free_shipping_threshold = Some(v);
        }
    }
}
