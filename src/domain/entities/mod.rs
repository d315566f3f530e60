//! # Domain Entities Module
//!
//! 키 기반 저장소와 캐시 계층이 다루는 엔티티들입니다.
//!
//! ## 엔티티 목록
//!
//! | 엔티티 | 컬렉션 | 라우트 |
//! |--------|--------|--------|
//! | [`Book`] | `books` | `/api/v1/books` |
//! | [`Author`] | `authors` | `/api/v1/authors` |
//! | [`Employee`] | `employees` | `/api/v1/employees` |
//!
//! ## 공통 계약
//!
//! [`Entity`]를 구현하는 타입은 제네릭 CRUD 핸들러, 캐시 등록,
//! 저장소 선택에 그대로 사용할 수 있습니다.
//!
//! ```rust,ignore
//! let books = registry.resolve::<EntityCache<Book>>()?;
//! let book = books.get_by_id(&5).await?;
//! ```

pub mod author;
pub mod book;
pub mod employee;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::repositories::Keyed;

pub use author::Author;
pub use book::Book;
pub use employee::Employee;

/// 정수 키를 가진 저장 가능한 엔티티
pub trait Entity:
    Keyed<Key = i32> + Clone + Serialize + DeserializeOwned + Validate + Unpin + Send + Sync + 'static
{
    /// 로그와 캐시 테이블에 쓰이는 복수형 이름 (예: `books`)
    const NAME: &'static str;

    /// MongoDB 컬렉션 이름
    const COLLECTION: &'static str = Self::NAME;

    /// 환경 변수 접미사 (예: `BOOKS` → `CACHE_TTL_BOOKS_SECS`)
    const CONFIG_KEY: &'static str;

    fn id(&self) -> i32 {
        self.key()
    }
}
