use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::{Error, HttpResponse};
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;

use crate::core::errors::{AppError, ErrorEnvelope, ErrorKind};
use crate::middlewares::error_translator::classify;

pub struct ErrorTranslatorService<S> {
    pub service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorTranslatorService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        // 라우터가 요청을 독점해야 하므로 HttpRequest 복제본을 호출 너머로 들고 가지 않습니다.
        let target = format!("{} {}", req.method(), req.path());

        Box::pin(async move {
            let outcome = AssertUnwindSafe(async move { service.call(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(res)) => match res.response().error() {
                    None => Ok(res.map_into_left_body()),
                    Some(error) => {
                        let app_error = classify(error);
                        let detail = error.to_string();
                        let (http_req, _) = res.into_parts();
                        let response = translate(&target, &app_error, &detail);
                        Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                    }
                },
                Ok(Err(error)) => {
                    let app_error = classify(&error);
                    let detail = error.to_string();
                    let response = translate(&target, &app_error, &detail);
                    Err(InternalError::from_response(detail, response).into())
                }
                Err(panic) => {
                    let detail = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    let app_error = AppError::Unexpected(format!("handler panicked: {}", detail));
                    let response = translate(&target, &app_error, &detail);
                    Err(InternalError::from_response(detail, response).into())
                }
            }
        })
    }
}

/// 새 상관관계 ID로 봉투 응답을 만들고, 같은 ID로 원본 상세를 기록합니다.
fn translate(target: &str, error: &AppError, detail: &str) -> HttpResponse {
    let correlation_id = ErrorEnvelope::new_correlation_id();

    match error.kind() {
        ErrorKind::NotFound => {
            log::debug!("[{}] {} → {}: {}", correlation_id, target, error.kind(), detail);
        }
        ErrorKind::ValidationFailed | ErrorKind::Unauthorized | ErrorKind::Forbidden => {
            log::warn!("[{}] {} → {}: {}", correlation_id, target, error.kind(), detail);
        }
        ErrorKind::StoreUnavailable | ErrorKind::Unexpected => {
            log::error!("[{}] {} → {}: {}", correlation_id, target, error.kind(), detail);
        }
    }

    ErrorEnvelope::from_error(error, correlation_id).into_response()
}
