//! 카탈로그 서비스 백엔드
//!
//! 키 기반 저장소 위에 읽기 캐시 계층을 두고, 헬스 집계와 에러 변환 미들웨어를
//! 제공하는 Rust 기반 REST 서비스입니다.
//!
//! # Features
//!
//! - **캐시 계층**: TTL 기반 read-through 캐시, 쓰기 성공 시 무효화, 만료 항목 정리
//! - **키 기반 저장소**: 메모리 또는 MongoDB
//! - **헬스 집계**: 프로브 동시 실행, 가장 나쁜 상태로 집계
//! - **에러 변환**: 모든 실패를 상관관계 ID가 붙은 구조화된 응답으로 변환
//! - **명시적 DI**: 시작 시 한 번 구성되는 `ServiceRegistry`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ ErrorTranslator │ ← 실패 → ErrorEnvelope
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌──────────────────┐
//! │    Handlers     │      │ HealthAggregator │ ← GET /health
//! └─────────────────┘      └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   CachedStore   │ ← 캐시 계층
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   KeyedStore    │ ← memory | MongoDB
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use catalog_service_backend::app::build_state;
//! use catalog_service_backend::caching::EntityCache;
//! use catalog_service_backend::domain::Book;
//!
//! let state = build_state(&AppConfig::from_env()?).await?;
//! state.registry.initialize_all().await?;
//!
//! let books = state.registry.resolve::<EntityCache<Book>>()?;
//! let book = books.get_by_id(&5).await?;
//! ```

pub mod app;
pub mod caching;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod health;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
