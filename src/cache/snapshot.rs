//! Local recipe snapshot store
//!
//! Holds the single most recently fetched recipe result set. Reads and writes
//! are best-effort: failures are logged and reads fall back to an empty set,
//! so the retrieval flow always has something to work with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::CacheManager;
use crate::data::RecipeResultSet;
use crate::subscription::{self, Cancel};

/// Cache key of the recipe snapshot
const SNAPSHOT_KEY: &str = "recipes";

/// Stream of snapshot updates
pub type SnapshotStream = BoxStream<'static, RecipeResultSet>;

/// Storage for the latest recipe result set
#[async_trait]
pub trait RecipeCache: Send + Sync {
    /// Returns the latest snapshot, or an empty set if there is none
    async fn read(&self) -> RecipeResultSet;

    /// Replaces the snapshot
    async fn write(&self, snapshot: &RecipeResultSet);
}

/// Recipe snapshot persisted through a [`CacheManager`]
///
/// Without a cache manager (no home directory) the snapshot lives in memory
/// for the lifetime of the process.
#[derive(Debug)]
pub struct LocalCache {
    manager: Option<CacheManager>,
    latest: watch::Sender<RecipeResultSet>,
}

impl LocalCache {
    /// Opens the snapshot store, loading any snapshot left by a previous session
    pub fn open(manager: Option<CacheManager>) -> Self {
        let initial = manager
            .as_ref()
            .map(load_snapshot)
            .unwrap_or_default();
        let (latest, _) = watch::channel(initial);
        Self { manager, latest }
    }

    /// Memory-only snapshot store
    pub fn in_memory() -> Self {
        Self::open(None)
    }

    /// Subscribes to snapshot updates
    ///
    /// The stream starts with the current snapshot and then yields every
    /// subsequent write. Each call starts a fresh stream.
    pub fn subscribe(&self) -> (SnapshotStream, Cancel) {
        subscription::subscribe(self.latest.subscribe())
    }

    /// When the stored snapshot was written, if one exists on disk
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        let manager = self.manager.as_ref()?;
        match manager.read::<RecipeResultSet>(SNAPSHOT_KEY) {
            Ok(entry) => entry.map(|cached| cached.cached_at),
            Err(e) => {
                debug!(error = %e, "No readable snapshot timestamp");
                None
            }
        }
    }
}

/// Reads the persisted snapshot, treating any failure as "no data"
fn load_snapshot(manager: &CacheManager) -> RecipeResultSet {
    match manager.read::<RecipeResultSet>(SNAPSHOT_KEY) {
        Ok(Some(cached)) => cached.data,
        Ok(None) => RecipeResultSet::empty(),
        Err(e) => {
            warn!(error = %e, "Recipe cache unreadable, treating as empty");
            RecipeResultSet::empty()
        }
    }
}

#[async_trait]
impl RecipeCache for LocalCache {
    /// The latest snapshot, seeded from disk in [`LocalCache::open`]
    async fn read(&self) -> RecipeResultSet {
        self.latest.borrow().clone()
    }

    async fn write(&self, snapshot: &RecipeResultSet) {
        if let Some(ref manager) = self.manager {
            if let Err(e) = manager.write(SNAPSHOT_KEY, snapshot) {
                warn!(error = %e, "Failed to persist recipe snapshot");
            }
        }
        debug!(recipes = snapshot.len(), "Recipe snapshot replaced");
        self.latest.send_replace(snapshot.clone());
    }
}
