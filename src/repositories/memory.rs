//! 메모리 기반 Keyed Store
//!
//! 프로세스 수명 동안 유지되는 `BTreeMap` 저장소입니다.
//! 잠금은 동기식이며 await 지점을 넘어서 유지되지 않습니다.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use log::debug;

use crate::core::errors::{AppError, AppResult};
use crate::repositories::{ConnectionCheck, Keyed, KeyedStore};

pub struct InMemoryStore<K, V> {
    name: String,
    items: RwLock<BTreeMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V>
where
    K: Ord + Clone,
    V: Keyed<Key = K>,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(BTreeMap::new()),
        }
    }

    /// 초기 데이터와 함께 저장소를 생성합니다.
    pub fn with_items(name: impl Into<String>, items: impl IntoIterator<Item = V>) -> Self {
        let items = items.into_iter().map(|v| (v.key(), v)).collect();
        Self {
            name: name.into(),
            items: RwLock::new(items),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<K, V> KeyedStore<K, V> for InMemoryStore<K, V>
where
    K: Ord + Clone + Display + Send + Sync + 'static,
    V: Keyed<Key = K> + Clone + Send + Sync + 'static,
{
    async fn get_all(&self) -> AppResult<Vec<V>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &K) -> AppResult<Option<V>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(id).cloned())
    }

    async fn add(&self, value: V) -> AppResult<()> {
        let key = value.key();
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.contains_key(&key) {
            return Err(AppError::field(
                "id",
                format!("{} {} already exists", self.name, key),
            ));
        }
        debug!("{}: added {}", self.name, key);
        items.insert(key, value);
        Ok(())
    }

    async fn update(&self, value: V) -> AppResult<()> {
        let key = value.key();
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                debug!("{}: updated {}", self.name, key);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("{} {} not found", self.name, key))),
        }
    }

    async fn delete(&self, id: &K) -> AppResult<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items
            .remove(id)
            .map(|_| debug!("{}: deleted {}", self.name, id))
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", self.name, id)))
    }

    async fn exists(&self, id: &K) -> AppResult<bool> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.contains_key(id))
    }
}

#[async_trait]
impl<K, V> ConnectionCheck for InMemoryStore<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i32,
        label: &'static str,
    }

    impl Keyed for Item {
        type Key = i32;

        fn key(&self) -> i32 {
            self.id
        }
    }

    fn store() -> InMemoryStore<i32, Item> {
        InMemoryStore::with_items("items", vec![Item { id: 1, label: "one" }])
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let store = store();
        store.add(Item { id: 2, label: "two" }).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 2);

        store.update(Item { id: 2, label: "deux" }).await.unwrap();
        assert_eq!(store.get_by_id(&2).await.unwrap().unwrap().label, "deux");

        store.delete(&2).await.unwrap();
        assert!(!store.exists(&2).await.unwrap());
        assert_eq!(store.get_by_id(&2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_validation_failure() {
        let err = store().add(Item { id: 1, label: "again" }).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(err.field_errors().unwrap().contains_key("id"));
    }

    #[tokio::test]
    async fn test_missing_key_writes_are_not_found() {
        let store = store();
        assert_eq!(
            store.update(Item { id: 9, label: "x" }).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(store.delete(&9).await.unwrap_err().kind(), ErrorKind::NotFound);
    }
}
