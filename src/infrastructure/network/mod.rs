pub mod network_monitor;
pub mod reqwest_transport;

pub use network_monitor::NetworkMonitor;
pub use reqwest_transport::ReqwestTransport;
