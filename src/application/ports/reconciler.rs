use crate::domain::entities::offline::{HttpResponse, QueuedRequest};
use crate::domain::value_objects::LocalId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Hook through which replay and expiry resolve provisional entities.
#[async_trait]
pub trait ProvisionalReconciler: Send + Sync {
    /// Swaps the provisional entity created for `request` with the server's version.
    /// Returns the server-assigned id of a recognized create, even when the
    /// provisional entity was already removed locally.
    async fn confirm(
        &self,
        request: &QueuedRequest,
        response: &HttpResponse,
    ) -> Result<Option<String>, AppError>;

    /// Drops the provisional entity of an abandoned creation.
    async fn abandon(&self, local_id: &LocalId) -> Result<bool, AppError>;
}
