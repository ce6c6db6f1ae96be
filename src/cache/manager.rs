//! Cache manager for persisting data to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files along
//! with the time it was written. Writes go through a temporary file and a
//! rename, so a reader sees either the previous entry or the new one.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::APP_NAME;

/// Errors that can occur when reading or writing cache files
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache directory could not be created
    #[error("Failed to create cache directory: {0}")]
    Io(#[source] std::io::Error),

    /// Cache file exists but could not be read
    #[error("Failed to read cache entry '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Cache file could not be parsed
    #[error("Failed to parse cache entry '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cache file could not be written
    #[error("Failed to write cache entry '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Result of reading from cache
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/foody/` on Linux). Each key maps to exactly one file, so a write
/// replaces whatever was stored under that key before.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME)?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Returns the path of the temporary file used while writing a key
    fn temp_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!(".{}.json.tmp", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(CacheError::Io)
    }

    /// Writes data to the cache, replacing any previous entry for `key`
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "recipes")
    /// * `data` - The data to cache (must implement Serialize)
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&entry).map_err(|e| CacheError::Write {
            key: key.to_string(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })?;

        let temp = self.temp_path(key);
        fs::write(&temp, json)
            .and_then(|_| fs::rename(&temp, self.cache_path(key)))
            .map_err(|source| CacheError::Write {
                key: key.to_string(),
                source,
            })
    }

    /// Reads data from the cache
    ///
    /// # Returns
    /// * `Ok(Some(CachedData<T>))` if the entry exists and can be parsed
    /// * `Ok(None)` if no entry was ever written for `key`
    /// * `Err(CacheError)` if the entry exists but cannot be read or parsed
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedData<T>>, CacheError> {
        let content = match fs::read_to_string(self.cache_path(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };

        let entry: CacheEntry<T> =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                key: key.to_string(),
                source,
            })?;

        Ok(Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        cache.write("test_key", &data).expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Cache file should exist");
        assert!(
            !temp_dir.path().join(".test_key.json.tmp").exists(),
            "Temporary file should be renamed away"
        );

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"name\""));
        assert!(content.contains("\"cached_at\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<CachedData<TestData>> =
            cache.read("nonexistent_key").expect("Missing key is not an error");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_corrupt_entry_is_parse_error() {
        let (cache, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let result = cache.read::<TestData>("broken");

        assert!(matches!(result, Err(CacheError::Parse { .. })));
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        let data = TestData {
            name: "nested".to_string(),
            value: 1,
        };

        cache.write("nested_key", &data).expect("Write should succeed");

        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "timestamp".to_string(),
            value: 999,
        };

        let before = Utc::now();
        cache.write("timestamp_key", &data).expect("Write should succeed");
        let after = Utc::now();

        let result: CachedData<TestData> = cache
            .read("timestamp_key")
            .expect("Should read cache")
            .expect("Entry should exist");

        assert!(result.cached_at >= before, "cached_at should be after write started");
        assert!(result.cached_at <= after, "cached_at should be before write finished");
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(path_str.contains("foody"), "Cache path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_overwrite_existing_cache() {
        let (cache, _temp_dir) = create_test_cache();
        let data1 = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let data2 = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.write("overwrite_key", &data1).expect("First write should succeed");
        cache.write("overwrite_key", &data2).expect("Second write should succeed");

        let result: CachedData<TestData> = cache
            .read("overwrite_key")
            .expect("Should read cache")
            .expect("Entry should exist");

        assert_eq!(result.data, data2, "Cache should contain latest data");
    }
}
