use crate::application::ports::{LocalStateStore, OfflineRequestStore};
use crate::domain::entities::offline::{QueuedRequest, QueuedRequestDraft};
use crate::domain::value_objects::QueuedRequestId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Non-durable request queue with the same ordering and id rules as the SQLite store.
#[derive(Default)]
pub struct InMemoryOfflineRequestStore {
    inner: Mutex<MemoryQueue>,
}

#[derive(Default)]
struct MemoryQueue {
    last_id: Option<QueuedRequestId>,
    entries: Vec<QueuedRequest>,
}

impl InMemoryOfflineRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append_at(
        &self,
        draft: QueuedRequestDraft,
        created_at: DateTime<Utc>,
    ) -> QueuedRequestId {
        let mut queue = self.inner.lock().await;
        let id = queue
            .last_id
            .map(QueuedRequestId::next)
            .unwrap_or_else(QueuedRequestId::first);
        queue.last_id = Some(id);
        queue.entries.push(QueuedRequest::new(id, draft, created_at));
        id
    }
}

#[async_trait]
impl OfflineRequestStore for InMemoryOfflineRequestStore {
    async fn append(&self, draft: QueuedRequestDraft) -> Result<QueuedRequestId, AppError> {
        Ok(self.append_at(draft, Utc::now()).await)
    }

    async fn list_all(&self) -> Result<Vec<QueuedRequest>, AppError> {
        Ok(self.inner.lock().await.entries.clone())
    }

    async fn remove(&self, id: QueuedRequestId) -> Result<(), AppError> {
        self.inner.lock().await.entries.retain(|entry| entry.id != id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(self.inner.lock().await.entries.len())
    }
}

#[derive(Default)]
pub struct InMemoryLocalStateStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl LocalStateStore for InMemoryLocalStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Queue whose `remove` fails for chosen entries, as a locked database would.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct LockedRowsStore {
    inner: InMemoryOfflineRequestStore,
    locked: Mutex<Vec<QueuedRequestId>>,
}

#[cfg(test)]
impl LockedRowsStore {
    pub(crate) fn inner(&self) -> &InMemoryOfflineRequestStore {
        &self.inner
    }

    pub(crate) async fn lock_row(&self, id: QueuedRequestId) {
        self.locked.lock().await.push(id);
    }
}

#[cfg(test)]
#[async_trait]
impl OfflineRequestStore for LockedRowsStore {
    async fn append(&self, draft: QueuedRequestDraft) -> Result<QueuedRequestId, AppError> {
        self.inner.append(draft).await
    }

    async fn list_all(&self) -> Result<Vec<QueuedRequest>, AppError> {
        self.inner.list_all().await
    }

    async fn remove(&self, id: QueuedRequestId) -> Result<(), AppError> {
        if self.locked.lock().await.contains(&id) {
            return Err(AppError::Database("database is locked".into()));
        }
        self.inner.remove(id).await
    }

    async fn count(&self) -> Result<usize, AppError> {
        self.inner.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{HttpMethod, RequestHeaders, RequestUrl};

    fn draft() -> QueuedRequestDraft {
        QueuedRequestDraft::new(
            RequestUrl::new("https://api.example.com/projects/1".into()).unwrap(),
            HttpMethod::Delete,
            None,
            RequestHeaders::new(),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ids_increase_even_after_removal() {
        let store = InMemoryOfflineRequestStore::new();
        let first = store.append(draft()).await.unwrap();
        store.remove(first).await.unwrap();
        let second = store.append(draft()).await.unwrap();

        assert!(second > first);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
