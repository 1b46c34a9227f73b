use crate::application::ports::OfflineNotifier;
use crate::domain::entities::offline::OfflineNotification;
use std::sync::Mutex;

/// Keeps every notification in memory, in emission order.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<OfflineNotification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<OfflineNotification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl OfflineNotifier for RecordingNotifier {
    fn notify(&self, notification: &OfflineNotification) -> Result<(), String> {
        self.seen
            .lock()
            .map_err(|_| "notification log poisoned".to_string())?
            .push(notification.clone());
        Ok(())
    }
}
