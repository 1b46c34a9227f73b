pub mod connectivity;
pub mod http_transport;
pub mod local_state_store;
pub mod notifier;
pub mod offline_store;
pub mod reconciler;

pub use connectivity::ConnectivityProbe;
pub use http_transport::HttpTransport;
pub use local_state_store::LocalStateStore;
pub use notifier::OfflineNotifier;
pub use offline_store::OfflineRequestStore;
pub use reconciler::ProvisionalReconciler;
