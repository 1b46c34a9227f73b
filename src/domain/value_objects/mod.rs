pub mod offline;

pub use offline::{HttpMethod, LocalId, QueuedRequestId, RequestHeaders, RequestUrl};
