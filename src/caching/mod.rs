//! 캐싱 계층 모듈
//!
//! 저장소 앞에 투명하게 배치되는 프로세스 로컬 read-through 캐시를 제공합니다.
//!
//! # 주요 기능
//!
//! - 엔티티 타입별 TTL 캐시 테이블 ([`table::CacheTable`])
//! - `KeyedStore` 계약을 그대로 구현하는 데코레이터 ([`cached_store::CachedStore`])
//! - 쓰기 성공 시 키 단위 무효화, 진행 중인 조회의 오래된 채우기 거부
//! - 만료 항목을 주기적으로 정리하는 스위퍼 ([`CacheSweeper`])
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::caching::{CachedStore, EntityCache};
//!
//! let books: EntityCache<Book> = CachedStore::new(store, "books", Duration::from_secs(60));
//! let book = books.get_by_id(&5).await?;
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! CACHE_TTL_SECS=60              # 기본 TTL
//! CACHE_TTL_BOOKS_SECS=120       # 엔티티별 TTL
//! CACHE_SWEEP_INTERVAL_SECS=30   # 0이면 스위퍼 비활성화
//! ```

pub mod cached_store;
pub mod table;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;

use crate::repositories::KeyedStore;

pub use cached_store::CachedStore;
pub use table::{CacheEntry, CacheTable, FillTicket, Lookup};

/// 정수 키 엔티티에 대한 캐시 계층 (저장소 구현은 동적으로 선택됨)
pub type EntityCache<E> = CachedStore<i32, E, dyn KeyedStore<i32, E>>;

/// 타입을 지운 캐시 관리 인터페이스
pub trait CacheMaintenance: Send + Sync {
    fn cache_name(&self) -> &str;

    /// 만료된 항목을 제거하고 제거 수를 반환합니다.
    fn purge_expired(&self) -> usize;

    /// 모든 항목을 제거하고 제거 수를 반환합니다.
    fn clear(&self) -> usize;
}

/// 등록된 모든 캐시 테이블의 만료 항목을 정리합니다.
///
/// 만료 항목은 조회 시에도 무시되므로 스위퍼는 메모리 회수 용도일 뿐입니다.
#[derive(Clone, Default)]
pub struct CacheSweeper {
    caches: Vec<Arc<dyn CacheMaintenance>>,
}

impl CacheSweeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(mut self, cache: Arc<dyn CacheMaintenance>) -> Self {
        self.caches.push(cache);
        self
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// 한 번 정리하고 전체 제거 수를 반환합니다.
    pub fn sweep_once(&self) -> usize {
        self.caches
            .iter()
            .map(|cache| {
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("🧹 {}: purged {} expired entries", cache.cache_name(), removed);
                }
                removed
            })
            .sum()
    }

    /// 현재 런타임에 주기적 정리 작업을 띄웁니다.
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        info!("🧹 Cache sweeper started: {} tables every {:?}", self.len(), every);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // 첫 tick은 즉시 완료됨
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }
}
