use crate::application::ports::{LocalStateStore, OfflineNotifier};
use crate::domain::entities::offline::OfflineNotification;
use crate::shared::error::AppError;
use std::sync::Arc;

const VERSION_KEY: &str = "app_version";

/// Remembers the last running application version and announces upgrades.
pub struct VersionTracker {
    state: Arc<dyn LocalStateStore>,
    notifier: Arc<dyn OfflineNotifier>,
}

impl VersionTracker {
    pub fn new(state: Arc<dyn LocalStateStore>, notifier: Arc<dyn OfflineNotifier>) -> Self {
        Self { state, notifier }
    }

    pub async fn current(&self) -> Result<Option<String>, AppError> {
        self.state.load(VERSION_KEY).await
    }

    /// Records `version`. Returns true and emits `NewVersionAvailable` when it
    /// replaces a different recorded version; the first recorded version is silent.
    pub async fn announce(&self, version: &str) -> Result<bool, AppError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(AppError::ValidationError("version cannot be empty".into()));
        }

        let previous = self.state.load(VERSION_KEY).await?;
        if previous.as_deref() == Some(version) {
            return Ok(false);
        }
        self.state.save(VERSION_KEY, version).await?;

        let Some(previous) = previous else {
            tracing::debug!(target: "offline::version", version, "initial version recorded");
            return Ok(false);
        };
        tracing::info!(
            target: "offline::version",
            previous = %previous,
            version,
            "new application version"
        );
        self.notifier
            .notify(&OfflineNotification::NewVersionAvailable {
                version: version.to_string(),
            })
            .map_err(AppError::Internal)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::notification::RecordingNotifier;
    use crate::infrastructure::offline::InMemoryLocalStateStore;

    #[tokio::test]
    async fn announces_only_changed_versions() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tracker = VersionTracker::new(
            Arc::new(InMemoryLocalStateStore::default()),
            notifier.clone(),
        );

        assert!(!tracker.announce("1.0.0").await.unwrap());
        assert!(!tracker.announce("1.0.0").await.unwrap());
        assert!(tracker.announce("1.1.0").await.unwrap());

        assert_eq!(tracker.current().await.unwrap().as_deref(), Some("1.1.0"));
        assert_eq!(
            notifier.notifications(),
            vec![OfflineNotification::NewVersionAvailable {
                version: "1.1.0".into()
            }]
        );
    }

    #[tokio::test]
    async fn blank_version_is_rejected() {
        let tracker = VersionTracker::new(
            Arc::new(InMemoryLocalStateStore::default()),
            Arc::new(RecordingNotifier::default()),
        );
        assert!(tracker.announce("  ").await.is_err());
    }
}
