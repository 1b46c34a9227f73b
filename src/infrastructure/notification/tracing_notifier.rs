use crate::application::ports::OfflineNotifier;
use crate::domain::entities::offline::OfflineNotification;

/// Renders notifications as log lines. Used when no page side is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl OfflineNotifier for TracingNotifier {
    fn notify(&self, notification: &OfflineNotification) -> Result<(), String> {
        match notification {
            OfflineNotification::RequestExpired { .. } => tracing::warn!(
                target: "offline::notify",
                title = notification.title(),
                "{}",
                notification.body()
            ),
            _ => tracing::info!(
                target: "offline::notify",
                title = notification.title(),
                "{}",
                notification.body()
            ),
        }
        Ok(())
    }
}
