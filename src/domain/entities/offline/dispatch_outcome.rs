use super::http_exchange::HttpResponse;
use crate::domain::value_objects::{LocalId, QueuedRequestId};
use serde::{Deserialize, Serialize};

/// Result of handing a call to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The network answered; the response is passed through unmodified.
    Delivered(HttpResponse),
    /// The call was queued for later replay.
    AcceptedOffline(OfflineReceipt),
}

/// Identifies the stored entry; its creation time is the one kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineReceipt {
    pub request_id: QueuedRequestId,
    pub local_id: Option<LocalId>,
}

impl DispatchOutcome {
    pub fn is_offline(&self) -> bool {
        matches!(self, DispatchOutcome::AcceptedOffline(_))
    }

    /// Legacy response shape: status 200 with `{"offline": true}` for queued calls.
    pub fn into_response(self) -> HttpResponse {
        match self {
            DispatchOutcome::Delivered(response) => response,
            DispatchOutcome::AcceptedOffline(_) => {
                HttpResponse::new(200, serde_json::json!({ "offline": true }).to_string())
            }
        }
    }
}
