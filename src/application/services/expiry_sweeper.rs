use crate::application::ports::{OfflineNotifier, OfflineRequestStore, ProvisionalReconciler};
use crate::domain::entities::offline::{OfflineNotification, QueuedRequest, SweepReport};
use crate::shared::error::AppError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Evicts queued requests older than the configured TTL.
pub struct ExpirySweeper {
    store: Arc<dyn OfflineRequestStore>,
    notifier: Arc<dyn OfflineNotifier>,
    reconciler: Option<Arc<dyn ProvisionalReconciler>>,
    ttl: Duration,
}

impl ExpirySweeper {
    pub fn new(
        store: Arc<dyn OfflineRequestStore>,
        notifier: Arc<dyn OfflineNotifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            reconciler: None,
            ttl,
        }
    }

    pub fn with_reconciler(mut self, reconciler: Arc<dyn ProvisionalReconciler>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn sweep_once(&self) -> Result<SweepReport, AppError> {
        self.sweep_at(Utc::now()).await
    }

    /// One sweep evaluated against `now`. Only listing the store can fail the
    /// sweep; per-entry failures are logged and reported.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let entries = self.store.list_all().await?;
        let mut report = SweepReport {
            examined: entries.len(),
            ..SweepReport::default()
        };

        for entry in entries.iter().filter(|e| e.is_expired(now, self.ttl)) {
            match self.store.remove(entry.id).await {
                Ok(()) => {
                    expire_entry(entry, self.notifier.as_ref(), self.reconciler.as_deref())
                        .await;
                    report.expired.push(entry.id);
                }
                Err(err) => {
                    tracing::error!(
                        target: "offline::sweeper",
                        request_id = %entry.id,
                        error = %err,
                        "failed to delete expired request"
                    );
                    report.failed.push(entry.id);
                }
            }
        }

        if !report.expired.is_empty() {
            tracing::info!(
                target: "offline::sweeper",
                expired = report.expired.len(),
                examined = report.examined,
                "expired queued requests removed"
            );
        }
        Ok(report)
    }

    /// Runs a sweep every `interval` until the returned handle is shut down.
    pub fn spawn(self: Arc<Self>, interval: std::time::Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let sweeper = self;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = sweeper.sweep_once().await {
                            tracing::error!(
                                target: "offline::sweeper",
                                error = %err,
                                "expiry sweep failed"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(target: "offline::sweeper", "expiry sweeper stopped");
        });
        SweeperHandle { shutdown_tx, task }
    }
}

/// Notification and provisional clean-up for an entry that has just been deleted as expired.
pub(crate) async fn expire_entry(
    entry: &QueuedRequest,
    notifier: &dyn OfflineNotifier,
    reconciler: Option<&dyn ProvisionalReconciler>,
) {
    let notification = OfflineNotification::RequestExpired {
        request_id: Some(entry.id),
        operation: entry.describe(),
    };
    if let Err(err) = notifier.notify(&notification) {
        tracing::warn!(
            target: "offline::sweeper",
            request_id = %entry.id,
            error = %err,
            "failed to emit expiry notification"
        );
    }

    if let (Some(reconciler), Some(local_id)) = (reconciler, entry.local_id.as_ref()) {
        if let Err(err) = reconciler.abandon(local_id).await {
            tracing::warn!(
                target: "offline::sweeper",
                local_id = %local_id,
                error = %err,
                "failed to drop provisional entity of expired request"
            );
        }
    }
}

pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(target: "offline::sweeper", error = %err, "sweeper task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::QueuedRequestDraft;
    use crate::domain::value_objects::{HttpMethod, RequestHeaders, RequestUrl};
    use crate::infrastructure::notification::RecordingNotifier;
    use crate::infrastructure::offline::memory_store::LockedRowsStore;
    use crate::infrastructure::offline::InMemoryOfflineRequestStore;

    fn draft(name: &str) -> QueuedRequestDraft {
        QueuedRequestDraft::new(
            RequestUrl::new("https://api.example.com/projects".into()).unwrap(),
            HttpMethod::Post,
            Some(format!(r#"{{"name":"{name}"}}"#)),
            RequestHeaders::json_with_bearer("token"),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn removes_only_entries_past_ttl() {
        let store = Arc::new(InMemoryOfflineRequestStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let ttl = Duration::hours(24);
        let now = Utc::now();

        let stale = store
            .append_at(draft("stale"), now - ttl - Duration::milliseconds(1))
            .await;
        let fresh = store
            .append_at(draft("fresh"), now - ttl + Duration::milliseconds(1))
            .await;

        let sweeper = ExpirySweeper::new(store.clone(), notifier.clone(), ttl);
        let report = sweeper.sweep_at(now).await.unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.expired, vec![stale]);
        let remaining: Vec<_> = store.list_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![fresh]);

        let notes = notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert!(matches!(
            &notes[0],
            OfflineNotification::RequestExpired { operation, .. } if operation.contains("stale")
        ));
    }

    #[tokio::test]
    async fn failed_delete_does_not_stop_the_sweep() {
        let store = Arc::new(LockedRowsStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ttl = Duration::hours(1);
        let old = Utc::now() - Duration::hours(2);

        let first = store.inner().append_at(draft("first"), old).await;
        let stuck = store.inner().append_at(draft("stuck"), old).await;
        let third = store.inner().append_at(draft("third"), old).await;
        store.lock_row(stuck).await;

        let sweeper = ExpirySweeper::new(store.clone(), notifier.clone(), ttl);
        let report = sweeper.sweep_at(Utc::now()).await.unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.expired, vec![first, third]);
        assert_eq!(report.failed, vec![stuck]);
        let left: Vec<_> = store.list_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(left, vec![stuck]);
        assert_eq!(notifier.notifications().len(), 2);
        assert!(notifier.notifications().iter().all(|note| matches!(
            note,
            OfflineNotification::RequestExpired { request_id: Some(id), .. } if *id != stuck
        )));
    }

    #[tokio::test]
    async fn spawned_sweeper_stops_on_shutdown() {
        let store = Arc::new(InMemoryOfflineRequestStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let sweeper = Arc::new(ExpirySweeper::new(store.clone(), notifier, Duration::seconds(1)));

        store
            .append_at(draft("old"), Utc::now() - Duration::seconds(5))
            .await;

        let handle = sweeper.spawn(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        handle.shutdown().await;

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
