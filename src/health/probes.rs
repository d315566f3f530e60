//! 내장 헬스 프로브
//!
//! - [`SelfTestProbe`] - 항상 고정 상태를 반환 (집계 파이프라인 자체 검증용)
//! - [`StoreConnectivityProbe`] - 저장소 연결에 `ping` 수행
//! - [`ExternalDependencyProbe`] - 외부 엔드포인트에 `HEAD` 요청

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use tokio::time::Instant;

use crate::core::errors::{AppResult, ErrorContext};
use crate::health::{HealthProbe, HealthStatus, ProbeOutcome};
use crate::repositories::ConnectionCheck;

pub struct SelfTestProbe {
    name: String,
    status: HealthStatus,
}

impl SelfTestProbe {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self { name: name.into(), status }
    }
}

#[async_trait]
impl HealthProbe for SelfTestProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> AppResult<ProbeOutcome> {
        Ok(ProbeOutcome {
            status: self.status,
            description: Some("synthetic self-test".to_string()),
        })
    }
}

/// 저장소 연결 확인 프로브
///
/// 제한 시간 안에 `ping`이 성공하면 `Healthy`, 에러나 시간 초과면 `Unhealthy`입니다.
pub struct StoreConnectivityProbe {
    name: String,
    target: Arc<dyn ConnectionCheck>,
    timeout: Duration,
}

impl StoreConnectivityProbe {
    pub fn new(name: impl Into<String>, target: Arc<dyn ConnectionCheck>, timeout: Duration) -> Self {
        Self { name: name.into(), target, timeout }
    }
}

#[async_trait]
impl HealthProbe for StoreConnectivityProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> AppResult<ProbeOutcome> {
        match tokio::time::timeout(self.timeout, self.target.ping()).await {
            Ok(Ok(())) => Ok(ProbeOutcome::healthy()),
            Ok(Err(e)) => {
                warn!("Store probe failed: {}", e);
                Ok(ProbeOutcome::unhealthy(e.to_string()))
            }
            Err(_) => Ok(ProbeOutcome::unhealthy(format!(
                "store ping timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// 외부 의존성 도달 가능 여부 프로브
///
/// | 결과 | 상태 |
/// |------|------|
/// | 연결 실패, 시간 초과, 성공이 아닌 상태 코드 | `Unhealthy` |
/// | 성공했지만 `degraded_threshold`보다 느림 | `Degraded` |
/// | 그 외 | `Healthy` |
pub struct ExternalDependencyProbe {
    name: String,
    url: String,
    client: reqwest::Client,
    degraded_threshold: Duration,
}

impl ExternalDependencyProbe {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
        degraded_threshold: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for health probe")?;

        Ok(Self {
            name: name.into(),
            url: url.into(),
            client,
            degraded_threshold,
        })
    }
}

#[async_trait]
impl HealthProbe for ExternalDependencyProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> AppResult<ProbeOutcome> {
        let started = Instant::now();
        let response = match self.client.head(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("External dependency {} unreachable: {}", self.url, e);
                return Ok(ProbeOutcome::unhealthy(format!("{} unreachable", self.url)));
            }
        };
        let elapsed = started.elapsed();

        let status = response.status();
        if !status.is_success() {
            return Ok(ProbeOutcome::unhealthy(format!("{} responded {}", self.url, status)));
        }

        if elapsed > self.degraded_threshold {
            return Ok(ProbeOutcome::degraded(format!(
                "{} responded in {}ms",
                self.url,
                elapsed.as_millis()
            )));
        }
        Ok(ProbeOutcome::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use crate::core::errors::AppError;
    use std::net::TcpListener;

    struct FailingConnection;

    #[async_trait]
    impl ConnectionCheck for FailingConnection {
        async fn ping(&self) -> AppResult<()> {
            Err(AppError::StoreUnavailable("connection refused".into()))
        }
    }

    struct SlowConnection;

    #[async_trait]
    impl ConnectionCheck for SlowConnection {
        async fn ping(&self) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    struct OkConnection;

    #[async_trait]
    impl ConnectionCheck for OkConnection {
        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_self_test_returns_configured_status() {
        let probe = SelfTestProbe::new("self_test", HealthStatus::Degraded);
        assert_eq!(probe.check().await.unwrap().status, HealthStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_probe_states() {
        let timeout = Duration::from_secs(1);

        let ok = StoreConnectivityProbe::new("store", Arc::new(OkConnection), timeout);
        assert_eq!(ok.check().await.unwrap().status, HealthStatus::Healthy);

        let failing = StoreConnectivityProbe::new("store", Arc::new(FailingConnection), timeout);
        let outcome = failing.check().await.unwrap();
        assert_eq!(outcome.status, HealthStatus::Unhealthy);
        assert!(outcome.description.unwrap().contains("connection refused"));

        let slow = StoreConnectivityProbe::new("store", Arc::new(SlowConnection), timeout);
        let outcome = slow.check().await.unwrap();
        assert_eq!(outcome.status, HealthStatus::Unhealthy);
        assert!(outcome.description.unwrap().contains("timed out"));
    }

    #[actix_web::test]
    async fn test_external_probe_unreachable_is_unhealthy() {
        // 바인딩 후 즉시 닫아 연결이 거부되는 포트를 얻는다
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let probe = ExternalDependencyProbe::new(
            "external",
            format!("http://127.0.0.1:{}/", port),
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(probe.check().await.unwrap().status, HealthStatus::Unhealthy);
    }

    #[actix_web::test]
    async fn test_external_probe_status_and_latency() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = HttpServer::new(|| {
            App::new()
                .route("/ok", web::head().to(|| async { HttpResponse::Ok().finish() }))
                .route(
                    "/slow",
                    web::head().to(|| async {
                        actix_web::rt::time::sleep(Duration::from_millis(300)).await;
                        HttpResponse::Ok().finish()
                    }),
                )
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let probe = |path: &str| {
            ExternalDependencyProbe::new(
                "external",
                format!("http://127.0.0.1:{}{}", port, path),
                Duration::from_secs(5),
                Duration::from_millis(100),
            )
            .unwrap()
        };

        assert_eq!(probe("/ok").check().await.unwrap().status, HealthStatus::Healthy);
        assert_eq!(probe("/slow").check().await.unwrap().status, HealthStatus::Degraded);
        assert_eq!(probe("/missing").check().await.unwrap().status, HealthStatus::Unhealthy);

        handle.stop(true).await;
    }
}
