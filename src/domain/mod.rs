//! # Domain Layer Module
//!
//! 카탈로그 서비스의 도메인 엔티티를 정의합니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! └── Entities  - Book, Author, Employee
//!      │
//!      ▼
//! Services / Handlers
//!      │
//!      ▼
//! Cache Layer → Keyed Store (Memory, MongoDB)
//! ```
//!
//! 모든 엔티티는 정수 `id`를 키로 가지며, JSON 필드명은 camelCase를 사용합니다.
//! 입력 검증은 `validator` 파생 규칙으로 선언되고, 위반 시 필드별 상세가 포함된
//! `ValidationFailed` 에러로 변환됩니다.

pub mod entities;

pub use entities::*;
