//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 단순 CRUD는 핸들러가 캐시 계층을 직접 사용하며,
//! 엔티티 간 규칙이 필요한 쓰기만 서비스가 담당합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::BookService;
//!
//! let service = registry.resolve::<BookService>()?;
//! service.add_book(book).await?;
//! ```

pub mod book_service;

pub use book_service::BookService;
