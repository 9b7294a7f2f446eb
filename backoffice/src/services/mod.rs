//! Services with in-memory read models over the backend

pub mod catalog;
pub mod lookups;
pub mod orders;
pub mod preferences;
pub mod settings;

pub use catalog::{CatalogService, ProductReference};
pub use lookups::{LookupRecord, LookupService, LookupTable};
pub use orders::{AvailableStockQuery, OrderQuery, OrderService};
pub use preferences::PreferenceStore;
pub use settings::SettingsService;
