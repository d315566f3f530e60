//! # Application Error Handling System
//!
//! 서비스 전역에서 사용하는 에러 분류 체계와 에러 응답 형식을 정의합니다.
//!
//! 모든 실패는 닫힌 분류 체계([`ErrorKind`])의 정확히 하나에 속하며,
//! 클라이언트에게는 [`ErrorEnvelope`] 형태(`kind`, `message`, `correlationId`)로만
//! 전달됩니다. 내부 에러 메시지는 서버 로그에만 남고 응답 본문에는 노출되지 않습니다.
//!
//! ## HTTP 응답 매핑
//!
//! | ErrorKind | HTTP Status | 사용 시나리오 |
//! |-----------|-------------|---------------|
//! | `NotFound` | 404 Not Found | 요청한 키가 저장소에 없음 |
//! | `ValidationFailed` | 400 Bad Request | 입력값 검증 실패 (필드 단위 상세 포함) |
//! | `Unauthorized` | 401 Unauthorized | 인증 실패 |
//! | `Forbidden` | 403 Forbidden | 권한 부족 |
//! | `StoreUnavailable` | 503 Service Unavailable | 일시적인 저장소 장애 (재시도 가능) |
//! | `Unexpected` | 500 Internal Server Error | 분류되지 않은 모든 에러 |
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::core::errors::{AppError, AppResult};
//!
//! async fn find_book(store: &EntityCache<Book>, id: i32) -> AppResult<Book> {
//!     store.get_by_id(&id).await?
//!         .ok_or_else(|| AppError::NotFound(format!("book {} not found", id)))
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 상관관계 ID를 전달하는 응답 헤더 이름
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// `StoreUnavailable` 응답에 포함되는 재시도 권장 대기 시간 (초)
const RETRY_AFTER_SECS: u32 = 5;

/// 닫힌 에러 분류 체계
///
/// 응답 본문의 `kind` 필드에는 항상 이 중 정확히 하나가 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    Unauthorized,
    Forbidden,
    StoreUnavailable,
    Unexpected,
}

impl ErrorKind {
    /// 분류 체계에 속한 모든 종류
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::NotFound,
        ErrorKind::ValidationFailed,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::StoreUnavailable,
        ErrorKind::Unexpected,
    ];

    /// 에러 종류에 대응하는 HTTP 상태 코드를 반환합니다.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에게 노출해도 안전한 고정 메시지를 반환합니다.
    ///
    /// 인증/인가 실패는 정책 내부 정보를 숨기기 위해 항상 이 메시지만 사용합니다.
    pub fn safe_message(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "The requested resource was not found",
            ErrorKind::ValidationFailed => "The request failed validation",
            ErrorKind::Unauthorized => "Authentication is required",
            ErrorKind::Forbidden => "Access to this resource is forbidden",
            ErrorKind::StoreUnavailable => "The data store is temporarily unavailable, please retry",
            ErrorKind::Unexpected => "An unexpected error occurred",
        }
    }

    /// 프레임워크가 만든 에러를 HTTP 상태 코드로 분류합니다.
    ///
    /// `AppError`가 아닌 에러(경로 추출 실패, 페이로드 파싱 실패 등)에 사용됩니다.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => ErrorKind::StoreUnavailable,
            s if s.is_client_error() => ErrorKind::ValidationFailed,
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationFailed => "ValidationFailed",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
            ErrorKind::Unexpected => "Unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 필드 이름 → 검증 실패 메시지 목록
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// 애플리케이션 전역 에러 타입
///
/// 변형 하나가 [`ErrorKind`] 하나에 정확히 대응합니다.
/// `Display` 구현은 내부 상세 정보를 포함하므로 로그에만 사용하고,
/// 클라이언트 응답에는 [`AppError::public_message`]를 사용합니다.
///
/// ## 에러 변환 패턴
///
/// ```rust,ignore
/// // MongoDB 에러 변환
/// collection.find_one(filter).await
///     .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
///
/// // 검증 에러 변환 (필드 단위 상세 정보 유지)
/// payload.validate()?;
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// 요청한 키가 저장소에 없음 (404 Not Found)
    ///
    /// 정상적인 부정 결과이므로 에러 로그로 남기지 않습니다.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 입력값 검증 실패 (400 Bad Request)
    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        fields: FieldErrors,
    },

    /// 인증 실패 (401 Unauthorized)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 부족 (403 Forbidden)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 일시적인 저장소 장애 (503 Service Unavailable)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// 분류되지 않은 에러 (500 Internal Server Error)
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// 필드 상세 정보 없이 검증 실패 에러를 생성합니다.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationFailed {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// 단일 필드에 대한 검증 실패 에러를 생성합니다.
    ///
    /// ```rust,ignore
    /// return Err(AppError::field("authorId", "author does not exist"));
    /// ```
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.clone()]);
        AppError::ValidationFailed { message, fields }
    }

    /// 에러 종류와 메시지로 에러를 생성합니다.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::ValidationFailed => AppError::validation(message),
            ErrorKind::Unauthorized => AppError::Unauthorized(message),
            ErrorKind::Forbidden => AppError::Forbidden(message),
            ErrorKind::StoreUnavailable => AppError::StoreUnavailable(message),
            ErrorKind::Unexpected => AppError::Unexpected(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            AppError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// 클라이언트에게 전달할 메시지를 반환합니다.
    ///
    /// `NotFound`와 `ValidationFailed`만 자체 메시지를 사용하고,
    /// 나머지는 항상 [`ErrorKind::safe_message`]로 대체됩니다.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(message) => message.clone(),
            AppError::ValidationFailed { message, .. } => message.clone(),
            other => other.kind().safe_message().to_string(),
        }
    }

    /// 검증 실패 에러의 필드 단위 상세 정보
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::ValidationFailed { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// 호출자가 재시도해도 되는 에러인지 여부
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        AppError::ValidationFailed {
            message: ErrorKind::ValidationFailed.safe_message().to_string(),
            fields,
        }
    }
}

/// 클라이언트에게 전달되는 구조화된 에러 응답 본문
///
/// ```json
/// {
///   "kind": "ValidationFailed",
///   "message": "The request failed validation",
///   "correlationId": "7f1c9c52-2a7e-4e55-8d1c-0c1f4d1e9a10",
///   "details": { "title": ["title must be 1-200 characters"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub kind: ErrorKind,
    pub message: String,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorEnvelope {
    /// 요청마다 고유한 상관관계 ID를 생성합니다.
    pub fn new_correlation_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn from_error(error: &AppError, correlation_id: impl Into<String>) -> Self {
        Self {
            kind: error.kind(),
            message: error.public_message(),
            correlation_id: correlation_id.into(),
            details: error.field_errors().cloned(),
        }
    }

    /// 에러 종류에 맞는 상태 코드로 HTTP 응답을 만듭니다.
    ///
    /// 상관관계 ID는 본문과 `x-correlation-id` 헤더 양쪽에 기록되며,
    /// `StoreUnavailable`인 경우 `Retry-After` 헤더가 추가됩니다.
    pub fn into_response(self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.kind.status_code());
        builder.insert_header((CORRELATION_ID_HEADER, self.correlation_id.clone()));

        if self.kind == ErrorKind::StoreUnavailable {
            builder.insert_header((header::RETRY_AFTER, RETRY_AFTER_SECS.to_string()));
        }

        builder.json(self)
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 에러 변환 미들웨어 밖에서 사용될 때도 형식이 같도록
    /// 새 상관관계 ID로 [`ErrorEnvelope`]를 만듭니다.
    /// 미들웨어 안에서는 이 응답이 요청 단위 ID를 가진 응답으로 교체됩니다.
    fn error_response(&self) -> HttpResponse {
        ErrorEnvelope::from_error(self, ErrorEnvelope::new_correlation_id()).into_response()
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 `AppError::Unexpected`로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Unexpected(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::Unexpected(format!("{}: {}", f(), e)))
    }
}
