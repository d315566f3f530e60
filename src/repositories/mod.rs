//! 데이터 액세스 계층 (Keyed Store)
//!
//! 식별자로 키가 지정된 엔티티에 대한 비동기 CRUD 계약([`KeyedStore`])과
//! 두 가지 구현을 제공합니다.
//!
//! - [`memory::InMemoryStore`] - 프로세스 메모리 기반 저장소 (기본값)
//! - [`mongo::MongoStore`] - MongoDB 컬렉션 기반 저장소
//!
//! 캐시 계층([`crate::caching::CachedStore`])은 이 계약을 그대로 구현하여
//! 어떤 저장소 앞에도 투명하게 배치될 수 있습니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::{KeyedStore, memory::InMemoryStore};
//!
//! let store = InMemoryStore::<i32, Book>::new("books");
//! store.add(book).await?;
//! let found = store.get_by_id(&5).await?;
//! ```

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::core::errors::AppResult;

/// 고유 키를 가진 값
pub trait Keyed {
    type Key;

    fn key(&self) -> Self::Key;
}

/// 키 기반 비동기 CRUD 저장소 계약
///
/// 모든 연산은 저장소 수준 에러(`AppError`)로 실패할 수 있습니다.
/// - `update`/`delete`: 대상 키가 없으면 `NotFound`
/// - `add`: 같은 키가 이미 있으면 `ValidationFailed`
#[async_trait]
pub trait KeyedStore<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn get_all(&self) -> AppResult<Vec<V>>;

    async fn get_by_id(&self, id: &K) -> AppResult<Option<V>>;

    async fn add(&self, value: V) -> AppResult<()>;

    async fn update(&self, value: V) -> AppResult<()>;

    async fn delete(&self, id: &K) -> AppResult<()>;

    async fn exists(&self, id: &K) -> AppResult<bool>;
}

/// 저장소 백엔드 연결 확인
///
/// 헬스 프로브가 저렴한 연산(ping)으로 백엔드 가용성을 확인할 때 사용합니다.
#[async_trait]
pub trait ConnectionCheck: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}
