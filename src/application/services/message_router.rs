use super::replay_engine::ReplayEngine;
use crate::application::ports::OfflineNotifier;
use crate::domain::entities::offline::{ContextMessage, ReplayReport};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Handles messages crossing between the page side and the background side.
pub struct MessageRouter {
    replay: Arc<ReplayEngine>,
    alerts: Arc<dyn OfflineNotifier>,
}

impl MessageRouter {
    pub fn new(replay: Arc<ReplayEngine>, alerts: Arc<dyn OfflineNotifier>) -> Self {
        Self { replay, alerts }
    }

    /// `SYNC_REQUESTS` runs a replay pass and returns its report; every other
    /// message is shown through the alert notifier.
    pub async fn handle(&self, message: &ContextMessage) -> Result<Option<ReplayReport>, AppError> {
        if let ContextMessage::SyncRequests = message {
            tracing::debug!(target: "offline::messages", "sync requested");
            return self.replay.run_pass().await.map(Some);
        }

        if let Some(notification) = message.to_notification() {
            self.alerts
                .notify(&notification)
                .map_err(AppError::Internal)?;
        }
        Ok(None)
    }

    pub fn spawn(
        self: Arc<Self>,
        mut messages: broadcast::Receiver<ContextMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = messages.recv() => match received {
                        Ok(message) => {
                            if let Err(err) = self.handle(&message).await {
                                tracing::error!(
                                    target: "offline::messages",
                                    error = %err,
                                    "failed to handle context message"
                                );
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "offline::messages", skipped, "message router lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(target: "offline::messages", "message router stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::HttpTransport;
    use crate::domain::entities::offline::{HttpRequest, HttpResponse, OfflineNotification};
    use crate::infrastructure::notification::RecordingNotifier;
    use crate::infrastructure::offline::InMemoryOfflineRequestStore;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl HttpTransport for Unused {
        async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, AppError> {
            Err(AppError::Network("not expected".into()))
        }
    }

    fn router() -> (MessageRouter, Arc<RecordingNotifier>) {
        let alerts = Arc::new(RecordingNotifier::default());
        let replay = Arc::new(ReplayEngine::new(
            Arc::new(InMemoryOfflineRequestStore::new()),
            Arc::new(Unused),
            Arc::new(RecordingNotifier::default()),
            chrono::Duration::hours(24),
        ));
        (MessageRouter::new(replay, alerts.clone()), alerts)
    }

    #[tokio::test]
    async fn sync_request_runs_a_pass() {
        let (router, alerts) = router();
        let report = router.handle(&ContextMessage::SyncRequests).await.unwrap();
        assert_eq!(report.map(|r| r.remaining), Some(0));
        assert!(alerts.notifications().is_empty());
    }

    #[tokio::test]
    async fn page_messages_become_alerts() {
        let (router, alerts) = router();
        router
            .handle(&ContextMessage::RequestExpired {
                operation: "POST /projects".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            alerts.notifications(),
            vec![OfflineNotification::RequestExpired {
                request_id: None,
                operation: "POST /projects".into()
            }]
        );
    }

    #[tokio::test]
    async fn spawned_router_follows_the_bus() {
        let (router, alerts) = router();
        let (bus, rx) = broadcast::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = Arc::new(router).spawn(rx, stop_rx);

        bus.send(ContextMessage::NewVersionAvailable {
            version: "1.2.0".into(),
        })
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stop_tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(alerts.notifications().len(), 1);
    }
}
