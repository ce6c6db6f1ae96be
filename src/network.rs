//! Network connectivity signal
//!
//! `NetworkListener` publishes a boolean availability stream: one initial
//! value, then one item per transition. The platform has no portable
//! connectivity callback, so `ConnectivityMonitor` approximates one by probing
//! the API host on an interval and feeding the listener.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{BoxStream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Stream of connectivity transitions
pub type ConnectivityStream = BoxStream<'static, bool>;

#[derive(Debug)]
struct ListenerState {
    available: bool,
    events: mpsc::UnboundedSender<bool>,
    receiver: Option<mpsc::UnboundedReceiver<bool>>,
}

/// Tracks whether the network is reachable
///
/// Transitions are queued rather than conflated, so an observer sees every
/// change even if it falls behind.
#[derive(Debug)]
pub struct NetworkListener {
    state: Mutex<ListenerState>,
}

impl Default for NetworkListener {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkListener {
    pub fn new() -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(ListenerState {
                available: false,
                events,
                receiver: Some(receiver),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ListenerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets the initial availability and hands out the transition stream
    ///
    /// The stream starts with `is_connected` and then yields one item per
    /// transition. It is not restartable: only the first call returns it.
    pub fn check_network_availability(&self, is_connected: bool) -> Option<ConnectivityStream> {
        let mut state = self.lock();
        let receiver = state.receiver.take()?;
        state.available = is_connected;
        let _ = state.events.send(is_connected);

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            let value = receiver.recv().await?;
            Some((value, receiver))
        });
        Some(stream.boxed())
    }

    pub fn on_available(&self) {
        self.publish(true);
    }

    pub fn on_lost(&self) {
        self.publish(false);
    }

    fn publish(&self, value: bool) {
        let mut state = self.lock();
        if state.available == value {
            return;
        }
        state.available = value;
        info!(available = value, "Network availability changed");

        // Nothing is queued before the stream is handed out, so the initial
        // value is always the first item
        if state.receiver.is_none() {
            let _ = state.events.send(value);
        }
    }
}

/// Checks whether a TCP connection to `addr` can be opened within `timeout`
pub async fn probe(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(addr, error = %e, "Connectivity probe failed");
            false
        }
        Err(_) => {
            debug!(addr, "Connectivity probe timed out");
            false
        }
    }
}

/// Configuration for the connectivity monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Address probed for reachability, `host:port`
    pub probe_addr: String,
    /// Interval between probes
    pub interval: Duration,
    /// Timeout of a single probe
    pub probe_timeout: Duration,
    /// Whether monitoring is enabled
    pub enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_addr: "api.spoonacular.com:443".to_string(),
            interval: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(3),
            enabled: true,
        }
    }
}

/// Handle for the background connectivity probe
pub struct ConnectivityMonitor {
    shutdown_tx: mpsc::Sender<()>,
}

impl ConnectivityMonitor {
    /// Spawns the probe task feeding `listener`
    ///
    /// The first probe runs one interval after spawning; the caller supplies
    /// the initial value through [`NetworkListener::check_network_availability`].
    pub fn spawn(config: MonitorConfig, listener: Arc<NetworkListener>) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.interval);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if probe(&config.probe_addr, config.probe_timeout).await {
                                listener.on_available();
                            } else {
                                listener.on_lost();
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self { shutdown_tx }
    }

    /// Stops the probe task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_initial_value_then_one_event_per_transition() {
        let listener = NetworkListener::new();
        let mut stream = listener
            .check_network_availability(true)
            .expect("First call returns the stream");

        assert_eq!(stream.next().await, Some(true));

        listener.on_available();
        listener.on_lost();
        listener.on_lost();
        listener.on_available();
        drop(listener);

        let rest: Vec<bool> = stream.collect().await;
        assert_eq!(rest, vec![false, true]);
    }

    #[tokio::test]
    async fn test_changes_before_subscribing_are_not_replayed() {
        let listener = NetworkListener::new();
        listener.on_available();
        listener.on_lost();

        let mut stream = listener.check_network_availability(true).unwrap();
        drop(listener);

        assert_eq!(stream.next().await, Some(true));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_repeated_value_is_not_an_event() {
        let listener = NetworkListener::new();
        let mut stream = listener.check_network_availability(false).unwrap();
        assert_eq!(stream.next().await, Some(false));

        listener.on_lost();
        drop(listener);

        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_each_transition_is_observed_in_lockstep() {
        let listener = NetworkListener::new();
        let mut stream = listener.check_network_availability(false).unwrap();
        assert_eq!(stream.next().await, Some(false));

        listener.on_available();
        assert_eq!(stream.next().await, Some(true));
        listener.on_lost();
        assert_eq!(stream.next().await, Some(false));
    }

    #[test]
    fn test_stream_is_not_restartable() {
        let listener = NetworkListener::new();
        assert!(listener.check_network_availability(true).is_some());
        assert!(listener.check_network_availability(true).is_none());
    }

    #[tokio::test]
    async fn test_probe_reachable_and_unreachable() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();

        assert!(probe(&addr, Duration::from_secs(1)).await);

        drop(server);
        assert!(!probe(&addr, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_monitor_reports_lost_connection() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        drop(server);

        let listener = Arc::new(NetworkListener::new());
        let mut stream = listener.check_network_availability(true).unwrap();
        assert_eq!(stream.next().await, Some(true));

        let monitor = ConnectivityMonitor::spawn(
            MonitorConfig {
                probe_addr: addr,
                interval: Duration::from_millis(20),
                probe_timeout: Duration::from_millis(200),
                enabled: true,
            },
            listener.clone(),
        );

        let next = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert_eq!(next.ok().flatten(), Some(false));

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_disabled_monitor_never_probes() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        drop(server);

        let listener = Arc::new(NetworkListener::new());
        let mut stream = listener.check_network_availability(true).unwrap();
        assert_eq!(stream.next().await, Some(true));

        let monitor = ConnectivityMonitor::spawn(
            MonitorConfig {
                probe_addr: addr,
                interval: Duration::from_millis(20),
                probe_timeout: Duration::from_millis(200),
                enabled: false,
            },
            listener.clone(),
        );

        let next = tokio::time::timeout(Duration::from_millis(300), stream.next()).await;
        assert!(next.is_err(), "A disabled monitor must not report transitions");

        monitor.shutdown().await;
    }

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.probe_addr, "api.spoonacular.com:443");
        assert_eq!(config.interval, Duration::from_secs(15));
        assert!(config.enabled);
    }
}
