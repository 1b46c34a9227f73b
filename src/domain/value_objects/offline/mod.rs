pub mod http_method;
pub mod local_id;
pub mod queued_request_id;
pub mod request_headers;
pub mod request_url;

pub use http_method::HttpMethod;
pub use local_id::LocalId;
pub use queued_request_id::QueuedRequestId;
pub use request_headers::RequestHeaders;
pub use request_url::RequestUrl;
