use crate::application::ports::{ConnectivityProbe, HttpTransport};
use crate::domain::entities::offline::HttpRequest;
use crate::domain::value_objects::{RequestHeaders, RequestUrl};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Connectivity as seen by the host, plus the outcome of direct reachability checks.
/// Online when the host reports online or a check succeeded within `window`.
pub struct NetworkMonitor {
    reported: AtomicBool,
    last_success: Mutex<Option<Instant>>,
    window: Duration,
    state: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool, window: Duration) -> Self {
        let (state, _) = watch::channel(initially_online);
        Self {
            reported: AtomicBool::new(initially_online),
            last_success: Mutex::new(None),
            window,
            state,
        }
    }

    /// Receives every online/offline transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    pub fn set_online(&self, online: bool) {
        self.reported.store(online, Ordering::SeqCst);
        if !online {
            if let Ok(mut last) = self.last_success.lock() {
                *last = None;
            }
        }
        self.publish();
    }

    pub fn record_successful_check(&self) {
        if let Ok(mut last) = self.last_success.lock() {
            *last = Some(Instant::now());
        }
        self.publish();
    }

    pub fn record_failed_check(&self) {
        if let Ok(mut last) = self.last_success.lock() {
            *last = None;
        }
        self.publish();
    }

    /// Any HTTP answer from `url` counts as reachable.
    pub async fn probe(&self, transport: &dyn HttpTransport, url: &RequestUrl) -> bool {
        let request = HttpRequest::get(url.clone(), RequestHeaders::new());
        match transport.send(&request).await {
            Ok(response) => {
                tracing::debug!(
                    target: "offline::network",
                    url = %url,
                    status = response.status,
                    "reachability check succeeded"
                );
                self.record_successful_check();
                true
            }
            Err(err) => {
                tracing::debug!(
                    target: "offline::network",
                    url = %url,
                    error = %err,
                    "reachability check failed"
                );
                self.record_failed_check();
                false
            }
        }
    }

    fn recently_reachable(&self) -> bool {
        self.last_success
            .lock()
            .ok()
            .and_then(|last| *last)
            .map(|at| at.elapsed() <= self.window)
            .unwrap_or(false)
    }

    fn publish(&self) {
        let online = self.is_online();
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            tracing::info!(target: "offline::network", online, "connectivity changed");
        }
    }
}

impl ConnectivityProbe for NetworkMonitor {
    fn is_online(&self) -> bool {
        self.reported.load(Ordering::SeqCst) || self.recently_reachable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::HttpResponse;
    use crate::shared::error::AppError;
    use async_trait::async_trait;

    struct Reachable(bool);

    #[async_trait]
    impl HttpTransport for Reachable {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, AppError> {
            if self.0 {
                Ok(HttpResponse::new(404, ""))
            } else {
                Err(AppError::Network("dns failure".into()))
            }
        }
    }

    fn url() -> RequestUrl {
        RequestUrl::new("https://api.example.com/".into()).unwrap()
    }

    #[test]
    fn transitions_are_published_once() {
        let monitor = NetworkMonitor::new(false, Duration::from_secs(30));
        let mut rx = monitor.subscribe();

        monitor.set_online(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        monitor.set_online(true);
        assert!(!rx.has_changed().unwrap());

        monitor.set_online(false);
        assert!(!*rx.borrow_and_update());
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn successful_probe_counts_as_online_within_window() {
        let monitor = NetworkMonitor::new(false, Duration::from_secs(30));
        assert!(monitor.probe(&Reachable(true), &url()).await);
        assert!(monitor.is_online());

        assert!(!monitor.probe(&Reachable(false), &url()).await);
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn stale_probe_does_not_count() {
        let monitor = NetworkMonitor::new(false, Duration::ZERO);
        monitor.probe(&Reachable(true), &url()).await;
        std::thread::sleep(Duration::from_millis(5));
        assert!(!monitor.is_online());
    }
}
