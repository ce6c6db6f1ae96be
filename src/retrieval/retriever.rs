//! Cache-first recipe retrieval
//!
//! A load checks the local snapshot first and serves it when it has recipes
//! and the caller did not force a refresh. Otherwise it fetches from the
//! remote source, stores a successful result as the new snapshot, and on
//! failure falls back to whatever snapshot exists, carrying the error message
//! alongside it.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use super::{Epoch, RetrievalStatus};
use crate::cache::RecipeCache;
use crate::data::{RecipeResultSet, RecipeSource};
use crate::preferences::PreferenceSource;

/// Outcome of the cache check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Serve the cached snapshot without touching the network
    ServeCached,
    /// Fetch from the remote source
    Fetch,
}

/// Decides between the cached snapshot and a remote fetch
///
/// The cache is only a shortcut: an empty snapshot or a forced refresh
/// (filter criteria may have changed) always goes to the network.
pub fn decide(cached: &RecipeResultSet, force_refresh: bool) -> Decision {
    if !cached.is_empty() && !force_refresh {
        Decision::ServeCached
    } else {
        Decision::Fetch
    }
}

/// Coordinates the cache, the remote source and the user's preferences
pub struct RecipeRetriever {
    source: Arc<dyn RecipeSource>,
    cache: Arc<dyn RecipeCache>,
    preferences: Arc<dyn PreferenceSource>,
    latest_epoch: AtomicU64,
}

impl RecipeRetriever {
    pub fn new(
        source: Arc<dyn RecipeSource>,
        cache: Arc<dyn RecipeCache>,
        preferences: Arc<dyn PreferenceSource>,
    ) -> Self {
        Self {
            source,
            cache,
            preferences,
            latest_epoch: AtomicU64::new(0),
        }
    }

    /// Starts a load request
    ///
    /// The returned stream is lazy: nothing is read or fetched until it is
    /// polled. It yields [`RetrievalStatus::Loading`] followed by exactly one
    /// terminal status. Starting a load supersedes every earlier one; see
    /// [`RecipeRetriever::is_current`].
    pub fn load(&self, force_refresh: bool) -> Load<'_> {
        let epoch = self.next_epoch();
        Load::new(epoch, self.resolve(epoch, force_refresh))
    }

    /// Same as [`RecipeRetriever::load`], but the stream owns a handle to the
    /// retriever so it can be moved onto a spawned task
    pub fn load_shared(retriever: &Arc<Self>, force_refresh: bool) -> Load<'static> {
        let epoch = retriever.next_epoch();
        let this = Arc::clone(retriever);
        Load::new(epoch, async move { this.resolve(epoch, force_refresh).await })
    }

    fn next_epoch(&self) -> Epoch {
        Epoch(self.latest_epoch.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Runs a load to completion and returns its terminal status
    pub async fn load_once(&self, force_refresh: bool) -> RetrievalStatus {
        let mut load = self.load(force_refresh);
        let mut last = RetrievalStatus::Loading;
        while let Some(status) = load.next().await {
            last = status;
        }
        last
    }

    /// Whether `epoch` belongs to the most recent load request
    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.latest_epoch.load(Ordering::SeqCst) == epoch.0
    }

    async fn resolve(&self, epoch: Epoch, force_refresh: bool) -> RetrievalStatus {
        let cached = self.cache.read().await;

        match decide(&cached, force_refresh) {
            Decision::ServeCached => {
                debug!(epoch = epoch.0, recipes = cached.len(), "Serving cached recipes");
                RetrievalStatus::Success(cached)
            }
            Decision::Fetch => self.fetch(epoch).await,
        }
    }

    async fn fetch(&self, epoch: Epoch) -> RetrievalStatus {
        let query = self.preferences.current_preferences();
        debug!(epoch = epoch.0, "Requesting recipes from API");

        match self.source.fetch(&query).await {
            Ok(recipes) => {
                info!(epoch = epoch.0, recipes = recipes.len(), "Fetched recipes");
                // A superseded load must not overwrite the newer load's snapshot
                if self.is_current(epoch) {
                    self.cache.write(&recipes).await;
                } else {
                    debug!(epoch = epoch.0, "Load superseded, snapshot left untouched");
                }
                RetrievalStatus::Success(recipes)
            }
            Err(e) => {
                warn!(epoch = epoch.0, error = %e, "Fetch failed, falling back to cache");
                let cached = self.cache.read().await;
                RetrievalStatus::Error {
                    message: e.to_string(),
                    cached,
                }
            }
        }
    }
}

/// Status stream of one load request
pub struct Load<'a> {
    epoch: Epoch,
    inner: BoxStream<'a, RetrievalStatus>,
}

impl<'a> Load<'a> {
    fn new(epoch: Epoch, terminal: impl Future<Output = RetrievalStatus> + Send + 'a) -> Self {
        Self {
            epoch,
            inner: stream::once(async { RetrievalStatus::Loading })
                .chain(stream::once(terminal))
                .boxed(),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl Stream for Load<'_> {
    type Item = RetrievalStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
