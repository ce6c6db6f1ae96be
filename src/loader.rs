//! Background load dispatch
//!
//! Runs recipe loads and connectivity observation on tokio tasks and reports
//! back to the main application over a channel, so the UI loop never blocks
//! on the network.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::network::ConnectivityStream;
use crate::retrieval::{Epoch, RecipeRetriever, RetrievalStatus};

/// Capacity of the message channel
const CHANNEL_CAPACITY: usize = 32;

/// Messages sent from background tasks to the main app
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// Progress of a load request
    Status {
        epoch: Epoch,
        status: RetrievalStatus,
    },
    /// Network availability changed
    Connectivity(bool),
}

/// Channel between background tasks and the main app
pub struct LoaderHandle {
    /// Channel for receiving messages
    pub receiver: mpsc::Receiver<AppMessage>,
    sender: mpsc::Sender<AppMessage>,
}

impl Default for LoaderHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderHandle {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self { receiver, sender }
    }

    /// Spawns a load and forwards every status it produces
    ///
    /// The epoch is assigned before the task is spawned, so loads requested
    /// in order get increasing epochs even if their tasks run out of order.
    pub fn spawn_load(&self, retriever: &Arc<RecipeRetriever>, force_refresh: bool) -> Epoch {
        let mut load = RecipeRetriever::load_shared(retriever, force_refresh);
        let epoch = load.epoch();
        let tx = self.sender.clone();

        tokio::spawn(async move {
            while let Some(status) = load.next().await {
                if tx.send(AppMessage::Status { epoch, status }).await.is_err() {
                    debug!(epoch = epoch.value(), "App gone, dropping load");
                    break;
                }
            }
        });

        epoch
    }

    /// Forwards connectivity transitions until the stream ends
    pub fn forward_connectivity(&self, mut stream: ConnectivityStream) {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            while let Some(available) = stream.next().await {
                if tx.send(AppMessage::Connectivity(available)).await.is_err() {
                    break;
                }
            }
        });
    }
}

/// Checks for pending messages without blocking
///
/// # Returns
/// * `Some(AppMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut LoaderHandle) -> Option<AppMessage> {
    handle.receiver.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{LocalCache, RecipeCache};
    use crate::data::{FetchError, QueryParameters, Recipe, RecipeResultSet, RecipeSource};
    use crate::network::NetworkListener;
    use crate::preferences::PreferenceStore;
    use async_trait::async_trait;

    struct OfflineSource;

    #[async_trait]
    impl RecipeSource for OfflineSource {
        async fn fetch(&self, _query: &QueryParameters) -> Result<RecipeResultSet, FetchError> {
            Err(FetchError::NetworkUnavailable)
        }
    }

    #[tokio::test]
    async fn test_spawn_load_forwards_statuses_in_order() {
        let cache = Arc::new(LocalCache::in_memory());
        cache
            .write(&RecipeResultSet::new(vec![Recipe::default()]))
            .await;
        let retriever = Arc::new(RecipeRetriever::new(
            Arc::new(OfflineSource),
            cache,
            Arc::new(PreferenceStore::in_memory()),
        ));
        let mut handle = LoaderHandle::new();

        let epoch = handle.spawn_load(&retriever, true);

        match handle.receiver.recv().await {
            Some(AppMessage::Status { epoch: e, status }) => {
                assert_eq!(e, epoch);
                assert_eq!(status, RetrievalStatus::Loading);
            }
            other => panic!("Expected loading status, got {:?}", other),
        }
        match handle.receiver.recv().await {
            Some(AppMessage::Status { status, .. }) => {
                assert_eq!(status.error_message(), Some("No Internet Connection."));
                assert_eq!(status.recipes().map(|r| r.len()), Some(1));
            }
            other => panic!("Expected terminal status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_connectivity() {
        let listener = NetworkListener::new();
        let stream = listener.check_network_availability(false).unwrap();
        let mut handle = LoaderHandle::new();

        handle.forward_connectivity(stream);
        listener.on_available();

        assert!(matches!(
            handle.receiver.recv().await,
            Some(AppMessage::Connectivity(false))
        ));
        assert!(matches!(
            handle.receiver.recv().await,
            Some(AppMessage::Connectivity(true))
        ));
    }

    #[test]
    fn test_try_recv_empty() {
        let mut handle = LoaderHandle::new();
        assert!(try_recv(&mut handle).is_none());
    }
}
