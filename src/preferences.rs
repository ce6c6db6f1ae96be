//! Persisted user preferences
//!
//! Stores the selected meal and diet type together with the "back online"
//! flag in `~/.config/foody/preferences.json`. Unreadable or missing files
//! yield defaults, so reading preferences never fails.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::APP_NAME;
use crate::data::{apply_queries, MealAndDietType, QueryParameters};

/// Preferences file name
const PREFERENCES_FILE: &str = "preferences.json";

/// Errors that can occur when saving preferences
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read-only access to the query derived from the user's preferences
pub trait PreferenceSource: Send + Sync {
    /// Query parameters for the current meal/diet selection
    fn current_preferences(&self) -> QueryParameters;
}

/// On-disk representation of the preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StoredPreferences {
    #[serde(flatten)]
    meal_and_diet: MealAndDietType,
    back_online: bool,
}

/// Preference store backed by a JSON file
///
/// Values are kept in memory and written through on every save.
#[derive(Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    current: Mutex<StoredPreferences>,
}

impl PreferenceStore {
    /// Opens the store in the XDG config directory
    ///
    /// Falls back to a memory-only store if no config directory can be determined.
    pub fn open() -> Self {
        let path = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join(PREFERENCES_FILE));
        Self::load(path)
    }

    /// Opens the store at a specific file path
    pub fn with_path(path: PathBuf) -> Self {
        Self::load(Some(path))
    }

    /// Memory-only store
    pub fn in_memory() -> Self {
        Self::load(None)
    }

    fn load(path: Option<PathBuf>) -> Self {
        let current = path.as_deref().map(read_file).unwrap_or_default();
        Self {
            path,
            current: Mutex::new(current),
        }
    }

    fn snapshot(&self) -> StoredPreferences {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Applies a change and persists the result
    ///
    /// The lock is held until the file is replaced, so concurrent saves land
    /// on disk in the order they were applied. The file is written to a
    /// sibling temp file and renamed over the old one.
    fn update(&self, apply: impl FnOnce(&mut StoredPreferences)) -> Result<(), PreferencesError> {
        let mut guard = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut guard);

        if let Some(ref path) = self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let temp = temp_path(path);
            fs::write(&temp, serde_json::to_string_pretty(&*guard)?)?;
            fs::rename(&temp, path)?;
        }
        Ok(())
    }

    /// Saves the meal and diet type chosen in the filter sheet
    pub fn save_meal_and_diet_type(
        &self,
        meal_type: &str,
        meal_type_id: usize,
        diet_type: &str,
        diet_type_id: usize,
    ) -> Result<(), PreferencesError> {
        self.update(|prefs| {
            prefs.meal_and_diet = MealAndDietType {
                selected_meal_type: meal_type.to_string(),
                selected_meal_type_id: meal_type_id,
                selected_diet_type: diet_type.to_string(),
                selected_diet_type_id: diet_type_id,
            };
        })
    }

    /// Records whether the app went offline and should announce reconnecting
    pub fn save_back_online(&self, back_online: bool) -> Result<(), PreferencesError> {
        self.update(|prefs| prefs.back_online = back_online)
    }

    pub fn read_meal_and_diet_type(&self) -> MealAndDietType {
        self.snapshot().meal_and_diet
    }

    pub fn read_back_online(&self) -> bool {
        self.snapshot().back_online
    }
}

impl PreferenceSource for PreferenceStore {
    fn current_preferences(&self) -> QueryParameters {
        apply_queries(&self.read_meal_and_diet_type())
    }
}

/// Reads the preferences file, falling back to defaults on any error
/// Sibling file a save is written to before it replaces `path`
fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

fn read_file(path: &Path) -> StoredPreferences {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return StoredPreferences::default(),
        Err(e) => {
            warn!(error = %e, "Preferences unreadable, using defaults");
            return StoredPreferences::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(error = %e, "Preferences corrupt, using defaults");
        StoredPreferences::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MEAL_TYPES, QUERY_DIET, QUERY_TYPE};
    use tempfile::TempDir;

    fn create_test_store() -> (PreferenceStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = PreferenceStore::with_path(temp_dir.path().join("prefs").join(PREFERENCES_FILE));
        (store, temp_dir)
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let (store, _temp_dir) = create_test_store();

        assert_eq!(store.read_meal_and_diet_type(), MealAndDietType::default());
        assert!(!store.read_back_online());
    }

    #[test]
    fn test_saved_values_survive_reopen() {
        let (store, temp_dir) = create_test_store();
        store.save_meal_and_diet_type("dessert", 2, "vegan", 3).unwrap();
        store.save_back_online(true).unwrap();

        let reopened =
            PreferenceStore::with_path(temp_dir.path().join("prefs").join(PREFERENCES_FILE));
        let selection = reopened.read_meal_and_diet_type();

        assert_eq!(selection.selected_meal_type, "dessert");
        assert_eq!(selection.selected_meal_type_id, 2);
        assert_eq!(selection.selected_diet_type, "vegan");
        assert_eq!(selection.selected_diet_type_id, 3);
        assert!(reopened.read_back_online());
    }

    #[test]
    fn test_save_replaces_file_without_leftover_temp() {
        let (store, temp_dir) = create_test_store();
        let path = temp_dir.path().join("prefs").join(PREFERENCES_FILE);
        store.save_meal_and_diet_type("dessert", 2, "vegan", 3).unwrap();
        store.save_meal_and_diet_type("snack", 10, "paleo", 7).unwrap();

        assert!(!temp_path(&path).exists(), "Temporary file should be renamed away");
        let reopened = PreferenceStore::with_path(path);
        assert_eq!(reopened.read_meal_and_diet_type().selected_meal_type, "snack");
    }

    #[test]
    fn test_concurrent_saves_leave_last_applied_on_disk() {
        let (store, temp_dir) = create_test_store();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .save_meal_and_diet_type(MEAL_TYPES[i], i, "vegan", 3)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reopened =
            PreferenceStore::with_path(temp_dir.path().join("prefs").join(PREFERENCES_FILE));
        assert_eq!(
            reopened.read_meal_and_diet_type(),
            store.read_meal_and_diet_type()
        );
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PREFERENCES_FILE);
        fs::write(&path, "{{{{").unwrap();

        let store = PreferenceStore::with_path(path);

        assert_eq!(store.read_meal_and_diet_type(), MealAndDietType::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PREFERENCES_FILE);
        fs::write(&path, r#"{"back_online": true}"#).unwrap();

        let store = PreferenceStore::with_path(path);

        assert!(store.read_back_online());
        assert_eq!(store.read_meal_and_diet_type(), MealAndDietType::default());
    }

    #[test]
    fn test_current_preferences_reflect_saved_selection() {
        let store = PreferenceStore::in_memory();
        store.save_meal_and_diet_type("soup", 7, "paleo", 5).unwrap();

        let query = store.current_preferences();

        assert_eq!(query.get(QUERY_TYPE), Some("soup"));
        assert_eq!(query.get(QUERY_DIET), Some("paleo"));
    }
}
