//! # Core Framework Module
//!
//! 서비스 전체가 공유하는 핵심 인프라를 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`registry`] - 의존성 레지스트리
//! - **ServiceRegistry**: 시작 시 한 번 구성되어 모든 핸들러에 전달되는 타입 기반 레지스트리
//! - **Lifecycle**: 등록 순서대로 초기화, 역순으로 종료되는 컴포넌트
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 닫힌 분류 체계(`ErrorKind`)에 대응하는 애플리케이션 에러
//! - **ErrorEnvelope**: `{kind, message, correlationId}` 형식의 에러 응답 본문
//! - **HTTP 통합**: Actix-Web `ResponseError` 구현
//!
//! ## 초기화 흐름
//!
//! ```text
//! main()
//!   ├─ 설정 로드 (config)
//!   ├─ 저장소 + 캐시 계층 구성 → ServiceRegistry 등록
//!   ├─ 헬스 프로브 구성 → HealthAggregator 등록
//!   ├─ registry.initialize_all()      ← 등록 순서대로
//!   ├─ HttpServer 실행
//!   └─ registry.shutdown_all()        ← 역순으로
//! ```

pub mod errors;
pub mod registry;

pub use errors::*;
pub use registry::*;
