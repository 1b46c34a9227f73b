pub mod entities;
pub mod value_objects;

pub use entities::{Project, Task};
pub use value_objects::{HttpMethod, LocalId, QueuedRequestId, RequestHeaders, RequestUrl};
