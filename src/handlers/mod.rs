//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 얇은 핸들러 함수들입니다.
//! 핸들러는 레지스트리에서 캐시 계층이나 서비스를 꺼내 호출하고,
//! 실패는 `AppError`로 그대로 반환합니다. 에러 응답 변환은
//! [`ErrorTranslator`](crate::middlewares::ErrorTranslator)가 담당합니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   ErrorTranslator - 실패 → ErrorEnvelope
//! ├─────────────────────────────────────────────┤
//!   Handlers (이 모듈) - HTTP 엔드포인트 처리         ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   Services / CachedStore - 검증, 캐시             ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   KeyedStore - memory | mongo                   ← Repository Layer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 모듈 구성
//!
//! - **`entities`**: 모든 엔티티 공통 CRUD (제네릭)
//! - **`books`**: 저자 검증을 포함한 도서 생성/수정
//! - **`health`**: `GET /health` 집계 상태

pub mod books;
pub mod entities;
pub mod health;

use actix_web::{HttpRequest, HttpResponse};

use crate::core::errors::{AppError, AppResult};

/// 일치하는 라우트가 없을 때의 기본 서비스
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
