use super::expiry_sweeper::expire_entry;
use crate::application::ports::{
    ConnectivityProbe, HttpTransport, LocalStateStore, OfflineNotifier, OfflineRequestStore,
    ProvisionalReconciler,
};
use crate::domain::entities::offline::{
    HttpResponse, OfflineNotification, QueuedRequest, ReplayFailure, ReplayReport,
};
use crate::domain::value_objects::RequestUrl;
use crate::shared::error::AppError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

const ID_MAP_KEY: &str = "replay:id_map";

/// Re-issues queued requests in enqueue order once connectivity returns.
pub struct ReplayEngine {
    store: Arc<dyn OfflineRequestStore>,
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn OfflineNotifier>,
    reconciler: Option<Arc<dyn ProvisionalReconciler>>,
    connectivity: Option<Arc<dyn ConnectivityProbe>>,
    ttl: Duration,
    gate: Mutex<()>,
    // temporary id -> server id, learned from confirmed creates
    id_remap: StdMutex<HashMap<String, String>>,
    id_map_store: Option<Arc<dyn LocalStateStore>>,
}

impl ReplayEngine {
    pub fn new(
        store: Arc<dyn OfflineRequestStore>,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn OfflineNotifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            notifier,
            reconciler: None,
            connectivity: None,
            ttl,
            gate: Mutex::new(()),
            id_remap: StdMutex::new(HashMap::new()),
            id_map_store: None,
        }
    }

    pub fn with_reconciler(mut self, reconciler: Arc<dyn ProvisionalReconciler>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Keeps confirmed temporary ids across restarts. Call
    /// [`restore_id_map`](Self::restore_id_map) before the first pass.
    pub fn with_id_map_store(mut self, state: Arc<dyn LocalStateStore>) -> Self {
        self.id_map_store = Some(state);
        self
    }

    /// Loads the persisted temporary id mapping. Returns the number of known ids.
    pub async fn restore_id_map(&self) -> Result<usize, AppError> {
        let Some(state) = &self.id_map_store else {
            return Ok(0);
        };
        let Some(raw) = state.load(ID_MAP_KEY).await? else {
            return Ok(0);
        };
        let restored: HashMap<String, String> = serde_json::from_str(&raw)?;
        let mut remap = self
            .id_remap
            .lock()
            .map_err(|_| AppError::Internal("replay id map poisoned".into()))?;
        remap.extend(restored);
        Ok(remap.len())
    }

    /// Passes are skipped while this probe reports offline.
    pub fn with_connectivity(mut self, connectivity: Arc<dyn ConnectivityProbe>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Fire-and-forget pass, used by event-driven triggers.
    pub fn trigger(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = engine.run_pass().await {
                tracing::error!(
                    target: "offline::replay",
                    error = %err,
                    "replay pass failed"
                );
            }
        });
    }

    pub async fn run_pass(&self) -> Result<ReplayReport, AppError> {
        let _guard = self.gate.lock().await;
        self.replay_locked(Utc::now()).await
    }

    /// Same as [`run_pass`](Self::run_pass) with an explicit clock for the TTL check.
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> Result<ReplayReport, AppError> {
        let _guard = self.gate.lock().await;
        self.replay_locked(now).await
    }

    async fn replay_locked(&self, now: DateTime<Utc>) -> Result<ReplayReport, AppError> {
        if let Some(connectivity) = &self.connectivity {
            if !connectivity.is_online() {
                tracing::debug!(target: "offline::replay", "offline; replay pass skipped");
                return Ok(ReplayReport::skipped());
            }
        }

        let snapshot = self.store.list_all().await?;
        let mut report = ReplayReport::default();

        for entry in &snapshot {
            if entry.is_expired(now, self.ttl) {
                // Expired entries are never sent; one that cannot be deleted now is left for the sweeper.
                match self.store.remove(entry.id).await {
                    Ok(()) => {
                        expire_entry(entry, self.notifier.as_ref(), self.reconciler.as_deref())
                            .await;
                        report.expired.push(entry.id);
                    }
                    Err(err) => {
                        tracing::error!(
                            target: "offline::replay",
                            request_id = %entry.id,
                            error = %err,
                            "failed to delete expired request"
                        );
                    }
                }
                continue;
            }

            let prepared = self.prepare(entry)?;
            match self.transport.send(&prepared.to_http_request()).await {
                Ok(response) if response.is_success() => {
                    self.store.remove(entry.id).await?;
                    self.reconcile(&prepared, &response).await;
                    self.emit(OfflineNotification::RequestSynced {
                        request_id: entry.id,
                        operation: entry.describe(),
                    });
                    report.delivered.push(entry.id);
                }
                Ok(response) => {
                    tracing::warn!(
                        target: "offline::replay",
                        request_id = %entry.id,
                        method = %entry.method,
                        url = %entry.url,
                        status = response.status,
                        "replay rejected by server; pass aborted"
                    );
                    report.aborted_at = Some(ReplayFailure {
                        request_id: entry.id,
                        status: Some(response.status),
                        reason: truncate(&response.body, 200),
                    });
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        target: "offline::replay",
                        request_id = %entry.id,
                        method = %entry.method,
                        url = %entry.url,
                        error = %err,
                        "replay delivery failed; pass aborted"
                    );
                    report.aborted_at = Some(ReplayFailure {
                        request_id: entry.id,
                        status: None,
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        if !report.delivered.is_empty() {
            self.emit(OfflineNotification::RequestsSent {
                count: report.delivered.len(),
            });
        }

        report.remaining = self.store.count().await?;
        tracing::info!(
            target: "offline::replay",
            delivered = report.delivered.len(),
            expired = report.expired.len(),
            remaining = report.remaining,
            aborted = report.aborted_at.is_some(),
            "replay pass finished"
        );
        Ok(report)
    }

    /// Copy of `entry` with temporary ids of already confirmed creates replaced
    /// by their server ids, in both URL and body.
    fn prepare(&self, entry: &QueuedRequest) -> Result<QueuedRequest, AppError> {
        let mut prepared = entry.clone();
        let remap = self.remap_snapshot();
        if remap.is_empty() {
            return Ok(prepared);
        }

        let mut url = prepared.url.as_str().to_string();
        for (temporary, confirmed) in &remap {
            if url.contains(temporary.as_str()) {
                url = url.replace(temporary.as_str(), confirmed);
            }
            if let Some(text) = prepared.body.as_mut() {
                if text.contains(temporary.as_str()) {
                    *text = text.replace(temporary.as_str(), confirmed);
                }
            }
        }
        prepared.url = RequestUrl::new(url).map_err(AppError::ValidationError)?;
        Ok(prepared)
    }

    async fn reconcile(&self, entry: &QueuedRequest, response: &HttpResponse) {
        let (Some(reconciler), Some(local_id)) = (&self.reconciler, &entry.local_id) else {
            return;
        };
        if !entry.is_create() {
            return;
        }
        match reconciler.confirm(entry, response).await {
            Ok(Some(server_id)) => {
                tracing::debug!(
                    target: "offline::replay",
                    local_id = %local_id,
                    server_id = %server_id,
                    "provisional entity confirmed"
                );
                if let Ok(mut remap) = self.id_remap.lock() {
                    remap.insert(local_id.as_str().to_string(), server_id);
                }
                self.save_id_map().await;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    target: "offline::replay",
                    local_id = %local_id,
                    error = %err,
                    "failed to reconcile provisional entity"
                );
            }
        }
    }

    async fn save_id_map(&self) {
        let Some(state) = &self.id_map_store else {
            return;
        };
        let snapshot: HashMap<String, String> = self.remap_snapshot().into_iter().collect();
        let saved = match serde_json::to_string(&snapshot) {
            Ok(raw) => state.save(ID_MAP_KEY, &raw).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = saved {
            tracing::warn!(
                target: "offline::replay",
                error = %err,
                "failed to persist confirmed id mapping"
            );
        }
    }

    fn remap_snapshot(&self) -> Vec<(String, String)> {
        self.id_remap
            .lock()
            .map(|remap| {
                remap
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn emit(&self, notification: OfflineNotification) {
        if let Err(err) = self.notifier.notify(&notification) {
            tracing::warn!(
                target: "offline::replay",
                error = %err,
                "failed to emit replay notification"
            );
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
