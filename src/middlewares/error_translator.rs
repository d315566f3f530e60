//! 에러 변환 미들웨어
//!
//! 요청 처리 파이프라인 전체를 감싸고, 처리되지 않은 실패를
//! [`ErrorEnvelope`](crate::core::errors::ErrorEnvelope) 응답으로 변환합니다.
//!
//! ```text
//! Idle ─▶ Intercepting ─┬─▶ Passthrough  (성공 또는 핸들러가 직접 만든 응답)
//!                       └─▶ Translating  (AppError, 프레임워크 에러, 패닉)
//! ```
//!
//! 요청 간에 유지되는 상태는 없습니다. 패닉이나 `Err` 결과는 요청 객체가 남아 있지 않으므로
//! 봉투 응답을 담은 `InternalError`로 반환되고, 서버는 그 응답을 그대로 내보냅니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::core::errors::{AppError, ErrorKind};
use crate::middlewares::error_translator_inner::ErrorTranslatorService;

/// 에러 변환 미들웨어
///
/// ```rust,ignore
/// App::new()
///     .wrap(ErrorTranslator)
///     .configure(configure_all_routes)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl<S, B> Transform<S, ServiceRequest> for ErrorTranslator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ErrorTranslatorService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorTranslatorService {
            service: Rc::new(service),
        }))
    }
}

/// 파이프라인에서 잡힌 실패를 분류합니다.
///
/// `AppError`는 그대로 사용하고, 그 외 프레임워크 에러(추출 실패, 페이로드 오류 등)는
/// 상태 코드로 분류한 뒤 안전한 고정 메시지만 남깁니다.
pub fn classify(error: &Error) -> AppError {
    match error.as_error::<AppError>() {
        Some(app_error) => app_error.clone(),
        None => {
            let kind = ErrorKind::from_status(error.as_response_error().status_code());
            AppError::from_kind(kind, kind.safe_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorEnvelope, CORRELATION_ID_HEADER};
    use actix_web::body::MessageBody;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App, HttpResponse};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        title: String,
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("fine")
    }

    async fn missing() -> Result<HttpResponse, AppError> {
        Err(AppError::NotFound("book 5 not found".into()))
    }

    async fn store_down() -> Result<HttpResponse, AppError> {
        Err(AppError::StoreUnavailable("mongodb://admin:secret@db timed out".into()))
    }

    async fn forbidden() -> Result<HttpResponse, AppError> {
        Err(AppError::Forbidden("missing claim View".into()))
    }

    async fn explode() -> HttpResponse {
        panic!("handler bug");
    }

    async fn deliberate_503() -> HttpResponse {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "Unhealthy" }))
    }

    async fn create(_payload: web::Json<Payload>) -> HttpResponse {
        HttpResponse::Created().finish()
    }

    async fn echo(id: web::Path<i32>) -> HttpResponse {
        HttpResponse::Ok().body(id.into_inner().to_string())
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(ErrorTranslator)
                    .route("/ok", web::get().to(ok))
                    .route("/missing", web::get().to(missing))
                    .route("/store", web::get().to(store_down))
                    .route("/forbidden", web::get().to(forbidden))
                    .route("/panic", web::get().to(explode))
                    .route("/health", web::get().to(deliberate_503))
                    .route("/books", web::post().to(create))
                    .route("/echo/{id}", web::get().to(echo))
                    .default_service(web::to(|| async {
                        Err::<HttpResponse, _>(AppError::NotFound("no route".into()))
                    })),
            )
            .await
        };
    }

    async fn envelope<B: MessageBody>(res: ServiceResponse<B>) -> (StatusCode, Option<String>, ErrorEnvelope) {
        let status = res.status();
        let header = res
            .headers()
            .get(CORRELATION_ID_HEADER)
            .map(|h| h.to_str().unwrap().to_string());
        let body: ErrorEnvelope = test::read_body_json(res).await;
        (status, header, body)
    }

    #[actix_web::test]
    async fn test_success_passes_through_unchanged() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(CORRELATION_ID_HEADER).is_none());
        assert_eq!(test::read_body(res).await, "fine");
    }

    #[actix_web::test]
    async fn test_path_parameters_still_resolve_behind_translator() {
        let app = app!();

        for _ in 0..3 {
            let res = test::call_service(&app, test::TestRequest::get().uri("/echo/42").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(test::read_body(res).await, "42");
        }
    }

    #[actix_web::test]
    async fn test_handler_built_error_status_passes_through() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "Unhealthy");
    }

    #[actix_web::test]
    async fn test_not_found_envelope() {
        let app = app!();
        let (status, header, body) =
            envelope(test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.kind, ErrorKind::NotFound);
        assert_eq!(body.message, "book 5 not found");
        assert_eq!(header.as_deref(), Some(body.correlation_id.as_str()));
    }

    #[actix_web::test]
    async fn test_store_unavailable_hides_detail_and_is_retryable() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/store").to_request()).await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(res.headers().contains_key(header::RETRY_AFTER));

        let body = test::read_body(res).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("StoreUnavailable"));
    }

    #[actix_web::test]
    async fn test_forbidden_message_is_generic() {
        let app = app!();
        let (status, _, body) =
            envelope(test::call_service(&app, test::TestRequest::get().uri("/forbidden").to_request()).await).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.message, ErrorKind::Forbidden.safe_message());
    }

    #[actix_web::test]
    async fn test_panic_becomes_unexpected() {
        let app = app!();
        let result = test::try_call_service(&app, test::TestRequest::get().uri("/panic").to_request()).await;
        let Err(error) = result else {
            panic!("panic should surface as a translated error");
        };

        let res = error.error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let header = res.headers().get(CORRELATION_ID_HEADER).cloned();

        let body = actix_web::body::to_bytes(res.into_body()).await.unwrap();
        let body: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.kind, ErrorKind::Unexpected);
        assert!(!body.message.contains("handler bug"));
        assert_eq!(header.unwrap().to_str().unwrap(), body.correlation_id);
    }

    #[actix_web::test]
    async fn test_framework_errors_are_classified() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/books")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{ not json")
            .to_request();
        let (status, _, body) = envelope(test::call_service(&app, req).await).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.kind, ErrorKind::ValidationFailed);

        let (status, _, body) =
            envelope(test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.kind, ErrorKind::NotFound);
    }

    #[actix_web::test]
    async fn test_correlation_ids_are_distinct_per_request() {
        let app = app!();
        let (_, _, first) = envelope(test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await).await;
        let (_, _, second) = envelope(test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await).await;

        assert_ne!(first.correlation_id, second.correlation_id);
    }

    #[actix_web::test]
    async fn test_classify_foreign_error_uses_safe_message() {
        let error: Error = actix_web::error::ErrorBadRequest("raw parser detail");
        let classified = classify(&error);

        assert_eq!(classified.kind(), ErrorKind::ValidationFailed);
        assert_eq!(classified.public_message(), ErrorKind::ValidationFailed.safe_message());
    }
}
