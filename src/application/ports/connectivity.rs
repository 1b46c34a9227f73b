pub trait ConnectivityProbe: Send + Sync {
    /// Whether a live network path is currently believed available.
    fn is_online(&self) -> bool;
}
