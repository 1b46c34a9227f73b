use crate::domain::entities::offline::{HttpRequest, HttpResponse};
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Any HTTP answer is `Ok`, including non-2xx. `Err` means no response was received.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError>;
}
