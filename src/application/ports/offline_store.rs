use crate::domain::entities::offline::{QueuedRequest, QueuedRequestDraft};
use crate::domain::value_objects::QueuedRequestId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, ordered log of pending mutating requests.
#[async_trait]
pub trait OfflineRequestStore: Send + Sync {
    /// Writes a new entry stamped with the current time. Fails if storage is unavailable.
    async fn append(&self, draft: QueuedRequestDraft) -> Result<QueuedRequestId, AppError>;

    /// Snapshot of every entry in insertion order.
    async fn list_all(&self) -> Result<Vec<QueuedRequest>, AppError>;

    /// Removing an unknown id is a no-op.
    async fn remove(&self, id: QueuedRequestId) -> Result<(), AppError>;

    async fn count(&self) -> Result<usize, AppError>;
}
