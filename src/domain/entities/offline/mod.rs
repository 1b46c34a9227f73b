pub mod context_message;
pub mod dispatch_outcome;
pub mod http_exchange;
pub mod notification;
pub mod queued_request;
pub mod reports;

pub use context_message::ContextMessage;
pub use dispatch_outcome::{DispatchOutcome, OfflineReceipt};
pub use http_exchange::{HttpRequest, HttpResponse};
pub use notification::OfflineNotification;
pub use queued_request::{QueuedRequest, QueuedRequestDraft};
pub use reports::{ReplayFailure, ReplayReport, SweepReport};
