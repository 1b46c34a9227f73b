use crate::application::ports::{ConnectivityProbe, HttpTransport, OfflineRequestStore};
use crate::domain::entities::offline::{
    DispatchOutcome, HttpRequest, OfflineReceipt, QueuedRequestDraft,
};
use crate::domain::value_objects::LocalId;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Single entry point for outgoing calls. Decides once, per call, whether to
/// send now or queue for replay.
pub struct OfflineDispatcher {
    store: Arc<dyn OfflineRequestStore>,
    transport: Arc<dyn HttpTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl OfflineDispatcher {
    pub fn new(
        store: Arc<dyn OfflineRequestStore>,
        transport: Arc<dyn HttpTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            store,
            transport,
            connectivity,
        }
    }

    pub async fn dispatch(
        &self,
        request: HttpRequest,
        local_id: Option<LocalId>,
    ) -> Result<DispatchOutcome, AppError> {
        if self.connectivity.is_online() || !request.method.is_mutating() {
            return self.send_direct(&request).await;
        }

        let draft = QueuedRequestDraft::from_http_request(&request, local_id.clone())
            .map_err(AppError::ValidationError)?;

        match self.store.append(draft).await {
            Ok(request_id) => {
                tracing::info!(
                    target: "offline::dispatcher",
                    request_id = %request_id,
                    method = %request.method,
                    url = %request.url,
                    "queued request while offline"
                );
                Ok(DispatchOutcome::AcceptedOffline(OfflineReceipt {
                    request_id,
                    local_id,
                }))
            }
            Err(err) => {
                // Without a working queue the call is attempted once, best effort.
                tracing::error!(
                    target: "offline::dispatcher",
                    error = %err,
                    method = %request.method,
                    url = %request.url,
                    "failed to queue offline request; attempting direct delivery"
                );
                self.send_direct(&request).await
            }
        }
    }

    async fn send_direct(&self, request: &HttpRequest) -> Result<DispatchOutcome, AppError> {
        let response = self.transport.send(request).await?;
        tracing::debug!(
            target: "offline::dispatcher",
            method = %request.method,
            url = %request.url,
            status = response.status,
            "request delivered"
        );
        Ok(DispatchOutcome::Delivered(response))
    }
}
