use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::SavedItem;
use crate::error::DomainError;
use crate::ports::LocalStore;

pub const SAVED_POSTS_KEY: &str = "savedPosts";
pub const HIDDEN_POSTS_KEY: &str = "hiddenPosts";
pub const SAVED_COMMENTS_KEY: &str = "savedComments";
pub const BLOCKED_USERS_KEY: &str = "blockedUsers";
pub const SAVED_CATEGORIES_KEY: &str = "savedCategories";
pub const ITEM_CATEGORIES_KEY: &str = "savedItemCategories";
pub const NOTIFICATION_PREFERENCES_KEY: &str = "notificationPreferences";

/// A JSON value kept whole under one local-store key.
pub struct LocalDocument<T> {
    store: Arc<dyn LocalStore>,
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalDocument<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> LocalDocument<T> {
    pub fn new(store: Arc<dyn LocalStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _value: PhantomData,
        }
    }

    /// Stored value, or `fallback()` when the entry is missing or unreadable.
    pub async fn load_or_else(&self, fallback: impl FnOnce() -> T) -> T {
        let Some(raw) = self.store.get(self.key).await else {
            return fallback();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key = self.key, error = %err, "Discarding unreadable local entry");
            fallback()
        })
    }

    pub async fn save(&self, value: &T) -> Result<(), DomainError> {
        let raw = serde_json::to_string(value).map_err(|e| DomainError::Storage(e.to_string()))?;
        self.store
            .set(self.key, &raw)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    pub async fn clear(&self) -> Result<(), DomainError> {
        self.store
            .delete(self.key)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))
    }
}

impl<T: Serialize + DeserializeOwned + Default> LocalDocument<T> {
    pub async fn load(&self) -> T {
        self.load_or_else(T::default).await
    }
}

/// A set of values kept in the local store as one JSON array.
///
/// Every change reads the whole list and writes it back.
pub struct FlagList<T = i64> {
    doc: LocalDocument<Vec<T>>,
}

impl<T> Clone for FlagList<T> {
    fn clone(&self) -> Self {
        Self {
            doc: self.doc.clone(),
        }
    }
}

impl<T: Serialize + DeserializeOwned + PartialEq> FlagList<T> {
    pub fn new(store: Arc<dyn LocalStore>, key: &'static str) -> Self {
        Self {
            doc: LocalDocument::new(store, key),
        }
    }

    /// Current values; a missing or unreadable entry counts as empty.
    pub async fn load(&self) -> Vec<T> {
        self.doc.load().await
    }

    pub async fn contains(&self, value: &T) -> bool {
        self.load().await.contains(value)
    }

    /// Add `value`; returns false when it was already present.
    pub async fn add(&self, value: T) -> Result<bool, DomainError> {
        let mut values = self.load().await;
        if values.contains(&value) {
            return Ok(false);
        }
        values.push(value);
        self.doc.save(&values).await?;
        Ok(true)
    }

    /// Remove `value`; returns false when it wasn't present.
    pub async fn remove(&self, value: &T) -> Result<bool, DomainError> {
        Ok(self.remove_all(std::slice::from_ref(value)).await? == 1)
    }

    /// Remove every listed value in one write; returns how many were present.
    pub async fn remove_all(&self, targets: &[T]) -> Result<usize, DomainError> {
        let mut values = self.load().await;
        let before = values.len();
        values.retain(|existing| !targets.contains(existing));
        let removed = before - values.len();
        if removed > 0 {
            self.doc.save(&values).await?;
        }
        Ok(removed)
    }
}

/// Category of each saved item, keyed by [`SavedItem::key`].
#[derive(Clone)]
pub struct CategoryAssignments {
    doc: LocalDocument<BTreeMap<String, String>>,
}

impl CategoryAssignments {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            doc: LocalDocument::new(store, ITEM_CATEGORIES_KEY),
        }
    }

    pub async fn get(&self, item: SavedItem) -> Option<String> {
        self.doc.load().await.remove(&item.key())
    }

    pub async fn set(&self, item: SavedItem, category: &str) -> Result<(), DomainError> {
        let mut map = self.doc.load().await;
        map.insert(item.key(), category.to_string());
        self.doc.save(&map).await
    }

    /// Drop the assignments of `items`; returns how many existed.
    pub async fn remove(&self, items: &[SavedItem]) -> Result<usize, DomainError> {
        let mut map = self.doc.load().await;
        let removed = items
            .iter()
            .filter(|item| map.remove(&item.key()).is_some())
            .count();
        if removed > 0 {
            self.doc.save(&map).await?;
        }
        Ok(removed)
    }

    /// Unassign every item filed under `category`.
    pub async fn clear_category(&self, category: &str) -> Result<usize, DomainError> {
        let mut map = self.doc.load().await;
        let before = map.len();
        map.retain(|_, assigned| assigned != category);
        let removed = before - map.len();
        if removed > 0 {
            self.doc.save(&map).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::ports::LocalStoreError;

    #[derive(Default)]
    pub(crate) struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl LocalStore for MapStore {
        async fn get(&self, key: &str) -> Option<String> {
            self.0.lock().await.get(key).cloned()
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
            self.0.lock().await.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), LocalStoreError> {
            self.0.lock().await.remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> bool {
            self.0.lock().await.contains_key(key)
        }
    }

    #[tokio::test]
    async fn add_and_remove_round_through_store() {
        let store = Arc::new(MapStore::default());
        let flags: FlagList = FlagList::new(store.clone(), SAVED_POSTS_KEY);

        assert!(flags.add(4).await.unwrap());
        assert!(!flags.add(4).await.unwrap());
        assert!(flags.add(9).await.unwrap());
        assert_eq!(store.get(SAVED_POSTS_KEY).await.as_deref(), Some("[4,9]"));

        assert!(flags.remove(&4).await.unwrap());
        assert!(!flags.remove(&4).await.unwrap());
        assert_eq!(flags.load().await, vec![9]);
    }

    #[tokio::test]
    async fn garbage_entry_reads_as_empty() {
        let store = Arc::new(MapStore::default());
        store.set(HIDDEN_POSTS_KEY, "not json").await.unwrap();

        let flags: FlagList = FlagList::new(store, HIDDEN_POSTS_KEY);
        assert!(flags.load().await.is_empty());
        assert!(!flags.contains(&1).await);
    }

    #[tokio::test]
    async fn remove_all_writes_once_and_counts_hits() {
        let store = Arc::new(MapStore::default());
        let flags: FlagList = FlagList::new(store.clone(), SAVED_COMMENTS_KEY);
        for id in [1, 2, 3] {
            flags.add(id).await.unwrap();
        }

        assert_eq!(flags.remove_all(&[1, 3, 7]).await.unwrap(), 2);
        assert_eq!(store.get(SAVED_COMMENTS_KEY).await.as_deref(), Some("[2]"));
        assert_eq!(flags.remove_all(&[7]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn string_lists_hold_handles() {
        let store = Arc::new(MapStore::default());
        let blocked = FlagList::new(store.clone(), BLOCKED_USERS_KEY);
        blocked.add("spammer".to_string()).await.unwrap();

        assert!(blocked.contains(&"spammer".to_string()).await);
        assert_eq!(store.get(BLOCKED_USERS_KEY).await.as_deref(), Some(r#"["spammer"]"#));
    }

    #[tokio::test]
    async fn assignments_are_keyed_by_kind_and_id() {
        let store = Arc::new(MapStore::default());
        let assignments = CategoryAssignments::new(store.clone());
        assignments.set(SavedItem::post(4), "Later").await.unwrap();
        assignments.set(SavedItem::comment(4), "Favorites").await.unwrap();

        assert_eq!(
            store.get(ITEM_CATEGORIES_KEY).await.as_deref(),
            Some(r#"{"comment_4":"Favorites","post_4":"Later"}"#)
        );
        assert_eq!(assignments.clear_category("Later").await.unwrap(), 1);
        assert_eq!(assignments.get(SavedItem::post(4)).await, None);
        assert_eq!(
            assignments.get(SavedItem::comment(4)).await.as_deref(),
            Some("Favorites")
        );
    }
}
