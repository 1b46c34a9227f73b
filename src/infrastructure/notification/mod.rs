pub mod channel_notifier;
pub mod recording_notifier;
pub mod tracing_notifier;

pub use channel_notifier::ChannelNotifier;
pub use recording_notifier::RecordingNotifier;
pub use tracing_notifier::TracingNotifier;
