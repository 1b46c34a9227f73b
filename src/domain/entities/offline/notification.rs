use crate::domain::value_objects::QueuedRequestId;
use serde::{Deserialize, Serialize};

/// User-facing notifications raised by the background side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfflineNotification {
    RequestSynced {
        request_id: QueuedRequestId,
        operation: String,
    },
    RequestsSent {
        count: usize,
    },
    RequestExpired {
        /// Absent when relayed from a context message, which only names the operation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<QueuedRequestId>,
        operation: String,
    },
    NewVersionAvailable {
        version: String,
    },
}

impl OfflineNotification {
    pub fn title(&self) -> &'static str {
        match self {
            OfflineNotification::RequestSynced { .. } => "Request synchronized",
            OfflineNotification::RequestsSent { .. } => "Offline changes sent",
            OfflineNotification::RequestExpired { .. } => "Request expired",
            OfflineNotification::NewVersionAvailable { .. } => "New version available",
        }
    }

    pub fn body(&self) -> String {
        match self {
            OfflineNotification::RequestSynced { operation, .. } => {
                format!("{operation} has been synchronized.")
            }
            OfflineNotification::RequestsSent { count } => {
                format!("{count} queued request(s) delivered.")
            }
            OfflineNotification::RequestExpired { operation, .. } => {
                format!("{operation} expired before it could be sent.")
            }
            OfflineNotification::NewVersionAvailable { version } => {
                format!("Version {version} is available. Reload to update.")
            }
        }
    }
}
