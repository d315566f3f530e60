//! # 캐시 계층 (Cached Keyed Store)
//!
//! 임의의 [`KeyedStore`] 앞에 놓이는 제네릭 캐싱 데코레이터입니다.
//! 저장소가 항상 진실의 원천이며, 캐시는 ID 단건 조회만 가속합니다.
//!
//! | 연산 | 동작 |
//! |------|------|
//! | `get_by_id` | 유효한 항목이 있으면 저장소 접근 없이 반환, 없으면 저장소 조회 후 채움 (부정 결과는 캐시하지 않음) |
//! | `get_all` | 항상 저장소에 위임, 기존 항목 유지 |
//! | `add` | 저장소에 위임, 캐시를 미리 채우지 않음 (지연 채우기) |
//! | `update` | 저장소 성공 후 해당 키 항목 제거 (제자리 갱신 없음) |
//! | `delete` | 저장소 성공 후 해당 키 항목 제거 |
//!
//! 쓰기가 `StoreUnavailable`(제한 시간 초과 포함)로 끝나면 저장소에 반영되었는지 알 수 없으므로
//! 이때도 항목을 제거합니다. 저장소가 거절한 쓰기(`NotFound` 등)는 항목을 그대로 둡니다.
//! | `exists` | 항상 저장소에서 확인 |
//!
//! 저장소 에러는 변경 없이 그대로 전파됩니다.
//! 호출 제한 시간이 설정되어 있으면 초과 시 `StoreUnavailable`로 실패합니다.

use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::caching::table::{CacheTable, Lookup};
use crate::caching::CacheMaintenance;
use crate::core::errors::{AppError, AppResult, ErrorKind};
use crate::core::registry::Lifecycle;
use crate::repositories::{Keyed, KeyedStore};

/// 캐싱 데코레이터
///
/// `S`는 구체 저장소 타입이거나 `dyn KeyedStore<K, V>`일 수 있습니다.
///
/// ```rust,ignore
/// let store: Arc<dyn KeyedStore<i32, Book>> = Arc::new(InMemoryStore::new("books"));
/// let books = CachedStore::new(store, "books", Duration::from_secs(60));
///
/// books.get_by_id(&5).await?; // 저장소 조회 후 캐시
/// books.get_by_id(&5).await?; // 캐시 적중
/// ```
pub struct CachedStore<K, V, S: ?Sized> {
    store: Arc<S>,
    table: CacheTable<K, V>,
    call_timeout: Option<Duration>,
}

impl<K, V, S> CachedStore<K, V, S>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Keyed<Key = K> + Clone + Send + Sync + 'static,
    S: KeyedStore<K, V> + ?Sized,
{
    pub fn new(store: Arc<S>, name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            table: CacheTable::new(name, ttl),
            call_timeout: None,
        }
    }

    /// 모든 저장소 호출에 적용할 제한 시간을 설정합니다.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn table(&self) -> &CacheTable<K, V> {
        &self.table
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match self.call_timeout {
            None => call.await,
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AppError::StoreUnavailable(format!(
                    "{} {} timed out after {:?}",
                    self.table.name(),
                    operation,
                    limit
                ))
            })?,
        }
    }

    fn settle_write(&self, key: &K, result: AppResult<()>) -> AppResult<()> {
        let invalidate = match &result {
            Ok(()) => true,
            Err(e) => e.kind() == ErrorKind::StoreUnavailable,
        };

        if invalidate {
            self.table.invalidate(key);
            debug!("cache invalidated: {}[{}]", self.table.name(), key);
        }
        result
    }
}

#[async_trait]
impl<K, V, S> KeyedStore<K, V> for CachedStore<K, V, S>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Keyed<Key = K> + Clone + Send + Sync + 'static,
    S: KeyedStore<K, V> + ?Sized,
{
    async fn get_all(&self) -> AppResult<Vec<V>> {
        self.bounded("get_all", self.store.get_all()).await
    }

    async fn get_by_id(&self, id: &K) -> AppResult<Option<V>> {
        let ticket = match self.table.lookup(id) {
            Lookup::Hit(value) => {
                debug!("cache hit: {}[{}]", self.table.name(), id);
                return Ok(Some(value));
            }
            Lookup::Miss(ticket) => ticket,
        };

        debug!("cache miss: {}[{}]", self.table.name(), id);
        let fetched = self.bounded("get_by_id", self.store.get_by_id(id)).await?;

        if let Some(value) = &fetched {
            if !self.table.fill(ticket, value.clone()) {
                debug!("discarded stale fill: {}[{}]", self.table.name(), id);
            }
        }
        Ok(fetched)
    }

    async fn add(&self, value: V) -> AppResult<()> {
        self.bounded("add", self.store.add(value)).await
    }

    async fn update(&self, value: V) -> AppResult<()> {
        let key = value.key();
        let result = self.bounded("update", self.store.update(value)).await;
        self.settle_write(&key, result)
    }

    async fn delete(&self, id: &K) -> AppResult<()> {
        let result = self.bounded("delete", self.store.delete(id)).await;
        self.settle_write(id, result)
    }

    async fn exists(&self, id: &K) -> AppResult<bool> {
        self.bounded("exists", self.store.exists(id)).await
    }
}

impl<K, V, S> CacheMaintenance for CachedStore<K, V, S>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: ?Sized + Send + Sync,
{
    fn cache_name(&self) -> &str {
        self.table.name()
    }

    fn purge_expired(&self) -> usize {
        self.table.purge_expired()
    }

    fn clear(&self) -> usize {
        self.table.clear()
    }
}

#[async_trait]
impl<K, V, S> Lifecycle for CachedStore<K, V, S>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: ?Sized + Send + Sync,
{
    fn name(&self) -> &str {
        self.table.name()
    }

    async fn init(&self) -> AppResult<()> {
        info!("🗃️ cache table {} ready (ttl {:?})", self.table.name(), self.table.ttl());
        Ok(())
    }

    async fn shutdown(&self) {
        let removed = self.table.clear();
        info!("🗃️ cache table {} cleared ({} entries)", self.table.name(), removed);
    }
}
