use crate::shared::error::AppError;
use async_trait::async_trait;

/// Small keyed store for client state such as collection snapshots.
#[async_trait]
pub trait LocalStateStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn save(&self, key: &str, value: &str) -> Result<(), AppError>;
}
