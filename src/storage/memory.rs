use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::Storage;
use crate::models::Paste;
use crate::ApiError;

/// Process-local store, for development and tests. Ids start at 1.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    pastes: BTreeMap<i64, Paste>,
}

#[cfg(test)]
impl MemoryStorage {
    /// Block every operation until the returned guard is dropped.
    pub(crate) async fn stall(&self) -> impl Send + 'static {
        self.inner.clone().write_owned().await
    }
}

impl Storage for MemoryStorage {
    async fn create_paste(&self, content: &str) -> crate::ApiResult<Paste> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;

        let paste = Paste {
            id: inner.last_id,
            content: content.to_owned(),
            created_at: Utc::now(),
        };
        inner.pastes.insert(paste.id, paste.clone());

        Ok(paste)
    }

    async fn get_paste(&self, id: i64) -> crate::ApiResult<Option<Paste>> {
        Ok(self.inner.read().await.pastes.get(&id).cloned())
    }

    async fn update_paste(&self, id: i64, content: &str) -> crate::ApiResult<Paste> {
        let mut inner = self.inner.write().await;
        let paste = inner.pastes.get_mut(&id).ok_or(ApiError::NotFound)?;
        paste.content = content.to_owned();
        Ok(paste.clone())
    }

    async fn delete_paste(&self, id: i64) -> crate::ApiResult<()> {
        self.inner
            .write()
            .await
            .pastes
            .remove(&id)
            .map(drop)
            .ok_or(ApiError::NotFound)
    }

    async fn list_pastes(&self) -> crate::ApiResult<Vec<Paste>> {
        let mut pastes: Vec<Paste> = self.inner.read().await.pastes.values().cloned().collect();
        pastes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pastes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_returns_same_content() {
        let storage = MemoryStorage::default();
        let before = Utc::now();

        let created = storage.create_paste("hello").await.unwrap();
        let fetched = storage.get_paste(created.id).await.unwrap().unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(fetched, created);
        assert!(fetched.created_at >= before);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get_paste(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_only_touches_content() {
        let storage = MemoryStorage::default();
        let created = storage.create_paste("before").await.unwrap();

        let updated = storage.update_paste(created.id, "after").await.unwrap();
        let fetched = storage.get_paste(created.id).await.unwrap().unwrap();

        assert_eq!(updated, fetched);
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.content, "after");
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let storage = MemoryStorage::default();
        assert!(matches!(
            storage.update_paste(1, "x").await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(storage.delete_paste(1).await, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let storage = MemoryStorage::default();
        let created = storage.create_paste("bye").await.unwrap();

        storage.delete_paste(created.id).await.unwrap();

        assert_eq!(storage.get_paste(created.id).await.unwrap(), None);
        assert!(matches!(
            storage.delete_paste(created.id).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let storage = MemoryStorage::default();
        let first = storage.create_paste("a").await.unwrap();
        storage.delete_paste(first.id).await.unwrap();

        let second = storage.create_paste("b").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_is_most_recent_first() {
        let storage = MemoryStorage::default();
        assert!(storage.list_pastes().await.unwrap().is_empty());

        for content in ["one", "two", "three"] {
            storage.create_paste(content).await.unwrap();
        }

        let pastes = storage.list_pastes().await.unwrap();
        let contents: Vec<_> = pastes.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["three", "two", "one"]);
        assert!(pastes
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }
}
