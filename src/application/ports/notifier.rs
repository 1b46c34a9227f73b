use crate::domain::entities::offline::OfflineNotification;

pub trait OfflineNotifier: Send + Sync {
    fn notify(&self, notification: &OfflineNotification) -> Result<(), String>;
}
