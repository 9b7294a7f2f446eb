//! Admin UI preferences

use serde::{Deserialize, Serialize};

/// Persisted admin preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub hide_out_of_stock: bool,
}

/// Partial preferences update
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub hide_out_of_stock: Option<bool>,
}

impl PreferencesUpdate {
    pub fn apply_to(&self, prefs: &mut Preferences) {
        if let Some(v) = self.dark_mode {
            prefs.dark_mode = v;
        }
        if let Some(v) = self.hide_out_of_stock {
            prefs.hide_out_of_stock = v;
        }
    }
}
