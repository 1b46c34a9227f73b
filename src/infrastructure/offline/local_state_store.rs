use super::rows::LocalStateRow;
use crate::application::ports::LocalStateStore;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

#[derive(Clone)]
pub struct SqliteLocalStateStore {
    pool: ConnectionPool,
}

impl SqliteLocalStateStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocalStateStore for SqliteLocalStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query_as::<_, LocalStateRow>("SELECT value FROM local_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool.get_pool())
            .await?;
        Ok(row.map(|row| row.value))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO local_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(self.pool.get_pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_overwrites_previous_value() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = SqliteLocalStateStore::new(pool);

        assert_eq!(store.load("app_version").await.unwrap(), None);
        store.save("app_version", "1.0.0").await.unwrap();
        store.save("app_version", "1.1.0").await.unwrap();
        assert_eq!(store.load("app_version").await.unwrap().as_deref(), Some("1.1.0"));
    }
}
