use super::mappers::{queued_request_from_row, timestamp_to_db};
use super::rows::QueuedRequestRow;
use crate::application::ports::OfflineRequestStore;
use crate::domain::entities::offline::{QueuedRequest, QueuedRequestDraft};
use crate::domain::value_objects::QueuedRequestId;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

/// `offline_requests` table. Row ids come from AUTOINCREMENT, so ordering by id
/// is enqueue order and ids are never reused.
#[derive(Clone)]
pub struct SqliteOfflineRequestStore {
    pool: ConnectionPool,
}

impl SqliteOfflineRequestStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Appends with an explicit timestamp. Used for imports and clock-controlled tests.
    pub async fn append_at(
        &self,
        draft: QueuedRequestDraft,
        created_at: DateTime<Utc>,
    ) -> Result<QueuedRequestId, AppError> {
        let headers = draft.headers.to_json()?;
        let result = sqlx::query(
            r#"
            INSERT INTO offline_requests (url, method, body, headers, created_at, local_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(draft.url.as_str())
        .bind(draft.method.as_str())
        .bind(draft.body.as_deref())
        .bind(&headers)
        .bind(timestamp_to_db(created_at))
        .bind(draft.local_id.as_ref().map(|id| id.as_str()))
        .execute(self.pool.get_pool())
        .await?;

        let id = QueuedRequestId::new(result.last_insert_rowid()).map_err(AppError::Database)?;
        tracing::debug!(
            target: "offline::store",
            request_id = %id,
            method = %draft.method,
            url = %draft.url,
            "request persisted"
        );
        Ok(id)
    }
}

#[async_trait]
impl OfflineRequestStore for SqliteOfflineRequestStore {
    async fn append(&self, draft: QueuedRequestDraft) -> Result<QueuedRequestId, AppError> {
        self.append_at(draft, Utc::now()).await
    }

    async fn list_all(&self) -> Result<Vec<QueuedRequest>, AppError> {
        let rows = sqlx::query_as::<_, QueuedRequestRow>(
            r#"
            SELECT id, url, method, body, headers, created_at, local_id
            FROM offline_requests
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        // Later entries may depend on an unreadable one, so the listing fails as a whole.
        rows.into_iter()
            .map(|row| {
                let id = row.id;
                queued_request_from_row(row).map_err(|err| {
                    tracing::error!(
                        target: "offline::store",
                        request_id = id,
                        error = %err,
                        "unreadable queued request"
                    );
                    err
                })
            })
            .collect()
    }

    async fn remove(&self, id: QueuedRequestId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM offline_requests WHERE id = ?1")
            .bind(id.value())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM offline_requests")
            .fetch_one(self.pool.get_pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
