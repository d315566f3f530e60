//! 미들웨어 모듈
//!
//! ActixWeb 요청 처리 파이프라인의 횡단 관심사를 처리합니다.
//!
//! # 제공 미들웨어
//!
//! ### 에러 변환 미들웨어 (ErrorTranslator)
//! - 핸들러 에러, 프레임워크 추출 에러, 패닉을 가로채 구조화된 에러 응답으로 변환
//! - 요청마다 새 상관관계 ID 발급 (`x-correlation-id` 헤더 및 본문)
//! - 내부 상세 정보는 같은 상관관계 ID와 함께 서버 로그에만 기록
//! - 핸들러가 직접 만든 응답은 상태 코드와 무관하게 그대로 통과
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{App, HttpServer};
//! use crate::middlewares::ErrorTranslator;
//!
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(ErrorTranslator)
//!         .configure(configure_all_routes)
//! })
//! ```

pub mod error_translator;
mod error_translator_inner;

pub use error_translator::ErrorTranslator;
