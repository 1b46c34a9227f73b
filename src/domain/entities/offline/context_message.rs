use super::notification::OfflineNotification;
use serde::{Deserialize, Serialize};

/// Messages exchanged between the background side and the page side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextMessage {
    NewVersionAvailable { version: String },
    RequestsSent { count: usize },
    RequestExpired { operation: String },
    SyncRequests,
}

impl ContextMessage {
    /// Message the page side should see for a notification, if any.
    /// Per-request sync notices are summarized by `REQUESTS_SENT`.
    pub fn from_notification(notification: &OfflineNotification) -> Option<Self> {
        match notification {
            OfflineNotification::RequestSynced { .. } => None,
            OfflineNotification::RequestsSent { count } => {
                Some(ContextMessage::RequestsSent { count: *count })
            }
            OfflineNotification::RequestExpired { operation, .. } => {
                Some(ContextMessage::RequestExpired {
                    operation: operation.clone(),
                })
            }
            OfflineNotification::NewVersionAvailable { version } => {
                Some(ContextMessage::NewVersionAvailable {
                    version: version.clone(),
                })
            }
        }
    }

    /// Notification a page-bound message should raise. `SYNC_REQUESTS` is a
    /// command for the background side and has none.
    pub fn to_notification(&self) -> Option<OfflineNotification> {
        match self {
            ContextMessage::NewVersionAvailable { version } => {
                Some(OfflineNotification::NewVersionAvailable {
                    version: version.clone(),
                })
            }
            ContextMessage::RequestsSent { count } => {
                Some(OfflineNotification::RequestsSent { count: *count })
            }
            ContextMessage::RequestExpired { operation } => {
                Some(OfflineNotification::RequestExpired {
                    request_id: None,
                    operation: operation.clone(),
                })
            }
            ContextMessage::SyncRequests => None,
        }
    }
}
