//! Admin preferences persisted to `{work_dir}/preferences.json`

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use shared::models::{Preferences, PreferencesUpdate};

use crate::error::ServiceResult;

pub struct PreferenceStore {
    path: PathBuf,
    current: RwLock<Preferences>,
    /// Serializes read-modify-write cycles and the shared tmp file
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    /// Read the preferences file; a missing or unreadable file yields defaults
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Self::read(&path).unwrap_or_default();
        Self {
            path,
            current: RwLock::new(current),
            write_lock: Mutex::new(()),
        }
    }

    fn read(path: &Path) -> Option<Preferences> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read preferences");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid preferences file, using defaults"
                );
                None
            }
        }
    }

    pub fn get(&self) -> Preferences {
        *self.current.read()
    }

    /// Atomic write: tmp file + rename
    async fn save(&self, prefs: Preferences) -> ServiceResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_string_pretty(&prefs)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn modify<F>(&self, change: F) -> ServiceResult<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        let _guard = self.write_lock.lock().await;
        let mut prefs = self.get();
        change(&mut prefs);
        self.save(prefs).await?;
        *self.current.write() = prefs;
        tracing::debug!(
            dark_mode = prefs.dark_mode,
            hide_out_of_stock = prefs.hide_out_of_stock,
            "Preferences saved"
        );
        Ok(prefs)
    }

    pub async fn update(&self, update: PreferencesUpdate) -> ServiceResult<Preferences> {
        self.modify(|p| update.apply_to(p)).await
    }

    pub async fn toggle_dark_mode(&self) -> ServiceResult<Preferences> {
        self.modify(|p| p.dark_mode = !p.dark_mode).await
    }

    pub async fn toggle_hide_out_of_stock(&self) -> ServiceResult<Preferences> {
        self.modify(|p| p.hide_out_of_stock = !p.hide_out_of_stock)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toggles_persist_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let store = PreferenceStore::load(&path);
        assert_eq!(store.get(), Preferences::default());

        assert!(store.toggle_dark_mode().await.unwrap().dark_mode);
        assert!(store.toggle_hide_out_of_stock().await.unwrap().hide_out_of_stock);

        let reloaded = PreferenceStore::load(&path);
        assert_eq!(
            reloaded.get(),
            Preferences {
                dark_mode: true,
                hide_out_of_stock: true
            }
        );

        let prefs = reloaded
            .update(PreferencesUpdate {
                dark_mode: Some(false),
                hide_out_of_stock: None,
            })
            .await
            .unwrap();
        assert!(!prefs.dark_mode);
        assert!(prefs.hide_out_of_stock);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_both_apply() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::load(dir.path().join("preferences.json"));

        let (a, b) = tokio::join!(store.toggle_dark_mode(), store.toggle_dark_mode());
        let mut seen = [a.unwrap().dark_mode, b.unwrap().dark_mode];
        seen.sort_unstable();
        assert_eq!(seen, [false, true]);
        assert!(!store.get().dark_mode);

        let reloaded = PreferenceStore::load(dir.path().join("preferences.json"));
        assert!(!reloaded.get().dark_mode);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(PreferenceStore::load(&path).get(), Preferences::default());
    }
}
