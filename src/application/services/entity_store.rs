use crate::application::ports::LocalStateStore;
use crate::domain::entities::StoredEntity;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

const SNAPSHOT_KEY_PREFIX: &str = "collection:";

/// Client-side collection of entities, including provisional ones awaiting
/// server confirmation. Order is insertion order.
pub struct EntityStore<T: StoredEntity> {
    items: RwLock<Vec<T>>,
    persistence: Option<Arc<dyn LocalStateStore>>,
}

impl<T: StoredEntity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoredEntity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            persistence: None,
        }
    }

    /// Collection backed by a persisted snapshot, rewritten after every change.
    pub fn persistent(persistence: Arc<dyn LocalStateStore>) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            persistence: Some(persistence),
        }
    }

    /// Loads the persisted snapshot, replacing the in-memory contents.
    pub async fn hydrate(&self) -> Result<usize, AppError> {
        let Some(persistence) = &self.persistence else {
            return Ok(0);
        };
        let Some(raw) = persistence.load(&snapshot_key::<T>()).await? else {
            return Ok(0);
        };
        let restored: Vec<T> = serde_json::from_str(&raw)?;
        let count = restored.len();
        *self.items.write().await = restored;
        tracing::debug!(
            target: "offline::entities",
            collection = T::COLLECTION,
            count,
            "collection hydrated"
        );
        Ok(count)
    }

    pub async fn all(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.items.read().await.iter().find(|e| e.id() == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn provisional_count(&self) -> usize {
        self.items
            .read()
            .await
            .iter()
            .filter(|e| e.is_provisional())
            .count()
    }

    /// Appends an optimistically created entity. Its id must be temporary and unused.
    pub async fn insert_provisional(&self, entity: T) -> Result<(), AppError> {
        if !entity.is_provisional() {
            return Err(AppError::InvalidInput(format!(
                "{} is not a temporary id",
                entity.id()
            )));
        }
        {
            let mut items = self.items.write().await;
            if items.iter().any(|e| e.id() == entity.id()) {
                return Err(AppError::InvalidInput(format!(
                    "provisional entity {} already exists in {}",
                    entity.id(),
                    T::COLLECTION
                )));
            }
            items.push(entity);
        }
        self.persist().await
    }

    /// Swaps the provisional entity for the confirmed one in the same position.
    /// Returns false and leaves the collection untouched when the provisional
    /// entity is gone, e.g. deleted locally before its creation was replayed.
    pub async fn replace_provisional(&self, temporary_id: &str, confirmed: T) -> Result<bool, AppError> {
        {
            let mut items = self.items.write().await;
            if !items.iter().any(|e| e.id() == temporary_id) {
                return Ok(false);
            }
            // A confirmed copy might already be present, e.g. from a refresh.
            items.retain(|e| e.id() != confirmed.id() || e.id() == temporary_id);
            if let Some(index) = items.iter().position(|e| e.id() == temporary_id) {
                items[index] = confirmed;
            }
        }
        self.persist().await?;
        Ok(true)
    }

    pub async fn remove_provisional(&self, temporary_id: &str) -> Result<bool, AppError> {
        self.remove(temporary_id).await
    }

    /// Inserts or replaces by id.
    pub async fn upsert(&self, entity: T) -> Result<(), AppError> {
        {
            let mut items = self.items.write().await;
            match items.iter_mut().find(|e| e.id() == entity.id()) {
                Some(existing) => *existing = entity,
                None => items.push(entity),
            }
        }
        self.persist().await
    }

    pub async fn update<F>(&self, id: &str, apply: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut T),
    {
        let updated = {
            let mut items = self.items.write().await;
            match items.iter_mut().find(|e| e.id() == id) {
                Some(existing) => {
                    apply(existing);
                    true
                }
                None => false,
            }
        };
        if updated {
            self.persist().await?;
        }
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<bool, AppError> {
        let removed = {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|e| e.id() != id);
            items.len() != before
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Replaces server-known entities with `fresh`, keeping provisional ones.
    pub async fn replace_confirmed(&self, fresh: Vec<T>) -> Result<(), AppError> {
        self.replace_confirmed_matching(fresh, |_| true).await
    }

    /// Like [`replace_confirmed`](Self::replace_confirmed), limited to the
    /// confirmed entities selected by `scope`. Fresh entities take the place of
    /// the first replaced one.
    pub async fn replace_confirmed_matching<P>(&self, fresh: Vec<T>, scope: P) -> Result<(), AppError>
    where
        P: Fn(&T) -> bool,
    {
        {
            let mut items = self.items.write().await;
            let mut kept = Vec::with_capacity(items.len() + fresh.len());
            let mut provisional = Vec::new();
            let mut fresh = Some(fresh);
            for entity in items.drain(..) {
                if entity.is_provisional() {
                    provisional.push(entity);
                } else if scope(&entity) {
                    if let Some(fresh) = fresh.take() {
                        kept.extend(fresh);
                    }
                } else {
                    kept.push(entity);
                }
            }
            if let Some(fresh) = fresh {
                kept.extend(fresh);
            }
            kept.extend(provisional);
            *items = kept;
        }
        self.persist().await
    }

    async fn persist(&self) -> Result<(), AppError> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        let snapshot = {
            let items = self.items.read().await;
            serde_json::to_string(&*items)?
        };
        persistence.save(&snapshot_key::<T>(), &snapshot).await
    }
}

fn snapshot_key<T: StoredEntity>() -> String {
    format!("{SNAPSHOT_KEY_PREFIX}{}", T::COLLECTION)
}
