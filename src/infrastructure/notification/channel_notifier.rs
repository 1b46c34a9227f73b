use crate::application::ports::OfflineNotifier;
use crate::domain::entities::offline::{ContextMessage, OfflineNotification};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Publishes page-bound notifications on the context message bus. When no page
/// side is listening they go to the fallback notifier instead.
#[derive(Clone)]
pub struct ChannelNotifier {
    bus: broadcast::Sender<ContextMessage>,
    fallback: Option<Arc<dyn OfflineNotifier>>,
}

impl ChannelNotifier {
    pub fn new(bus: broadcast::Sender<ContextMessage>) -> Self {
        Self {
            bus,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn OfflineNotifier>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl OfflineNotifier for ChannelNotifier {
    fn notify(&self, notification: &OfflineNotification) -> Result<(), String> {
        let Some(message) = ContextMessage::from_notification(notification) else {
            tracing::debug!(target: "offline::notify", "{}", notification.body());
            return Ok(());
        };
        if self.bus.receiver_count() == 0 {
            return match &self.fallback {
                Some(fallback) => fallback.notify(notification),
                None => Ok(()),
            };
        }
        self.bus
            .send(message)
            .map(|_| ())
            .map_err(|err| format!("context bus closed: {err}"))
    }
}
