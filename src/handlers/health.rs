//! 헬스 상태 엔드포인트
//!
//! 요청마다 [`HealthAggregator`]를 실행합니다. 전체 상태가 `Unhealthy`이면 503,
//! 그 외(`Healthy`, `Degraded`)는 200과 함께 집계 보고서를 반환합니다.
//! 응답 형식은 [`AggregateHealthReport`](crate::health::AggregateHealthReport)를 참고하세요.

use actix_web::{get, web, HttpResponse};

use crate::core::errors::AppResult;
use crate::core::registry::ServiceRegistry;
use crate::health::HealthAggregator;

#[get("/health")]
pub async fn health_check(registry: web::Data<ServiceRegistry>) -> AppResult<HttpResponse> {
    let report = registry.resolve::<HealthAggregator>()?.run().await;

    let response = if report.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(report)
    } else {
        HttpResponse::Ok().json(report)
    };
    Ok(response)
}
