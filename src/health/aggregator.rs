//! # 헬스 집계기
//!
//! 등록된 모든 프로브를 동시에 실행하고 하나의 [`AggregateHealthReport`]로 합칩니다.
//!
//! - 프로브마다 제한 시간이 적용되며, 초과하면 `Unhealthy` 보고서가 됩니다.
//! - `Err`를 반환하거나 패닉한 프로브도 `Unhealthy` 보고서가 되며 집계는 계속됩니다.
//! - 보고서 순서는 등록 순서와 같습니다.
//! - 집계기 자체는 구성 단계(빈 목록, 중복 이름)에서만 실패합니다.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::FutureExt;
use log::{debug, error, warn};
use tokio::time::Instant;

use crate::core::errors::{AppError, AppResult};
use crate::health::{AggregateHealthReport, HealthProbe, HealthReport, ProbeOutcome};

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct HealthAggregator {
    probes: Vec<Arc<dyn HealthProbe>>,
    probe_timeout: Duration,
}

impl HealthAggregator {
    pub fn builder() -> HealthAggregatorBuilder {
        HealthAggregatorBuilder::default()
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    /// 모든 프로브를 실행하고 집계 보고서를 반환합니다. 이 메서드는 실패하지 않습니다.
    pub async fn run(&self) -> AggregateHealthReport {
        let started = Instant::now();

        let entries = join_all(
            self.probes
                .iter()
                .map(|probe| run_probe(probe.as_ref(), self.probe_timeout)),
        )
        .await;

        let report = AggregateHealthReport::from_entries(entries, started.elapsed());
        debug!("🩺 Health aggregated: {} ({} probes)", report.status, report.entries.len());
        report
    }
}

async fn run_probe(probe: &dyn HealthProbe, timeout: Duration) -> HealthReport {
    let started = Instant::now();
    let guarded = AssertUnwindSafe(tokio::time::timeout(timeout, probe.check())).catch_unwind();

    let outcome = match guarded.await {
        Ok(Ok(Ok(outcome))) => outcome,
        Ok(Ok(Err(e))) => {
            warn!("Health probe {} failed: {}", probe.name(), e);
            ProbeOutcome::unhealthy(e.to_string())
        }
        Ok(Err(_)) => ProbeOutcome::unhealthy(format!("probe timed out after {:?}", timeout)),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Health probe {} panicked: {}", probe.name(), message);
            ProbeOutcome::unhealthy(format!("probe panicked: {}", message))
        }
    };

    HealthReport::new(probe.name(), outcome, started.elapsed())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 프로브 등록 목록 빌더
#[derive(Default)]
pub struct HealthAggregatorBuilder {
    probes: Vec<Arc<dyn HealthProbe>>,
    probe_timeout: Option<Duration>,
}

impl HealthAggregatorBuilder {
    pub fn probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// 등록 목록을 검증하고 집계기를 만듭니다.
    ///
    /// # Errors
    ///
    /// 프로브가 없거나 이름이 비었거나 중복되면 구성 오류(`Unexpected`)를 반환합니다.
    pub fn build(self) -> AppResult<HealthAggregator> {
        if self.probes.is_empty() {
            return Err(AppError::Unexpected("No health probes registered".to_string()));
        }

        let mut names = HashSet::new();
        for probe in &self.probes {
            let name = probe.name();
            if name.trim().is_empty() {
                return Err(AppError::Unexpected("Health probe with empty name".to_string()));
            }
            if !names.insert(name) {
                return Err(AppError::Unexpected(format!(
                    "Duplicate health probe name: {}",
                    name
                )));
            }
        }

        Ok(HealthAggregator {
            probes: self.probes,
            probe_timeout: self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthStatus, SelfTestProbe};
    use async_trait::async_trait;

    struct PanickingProbe;

    #[async_trait]
    impl HealthProbe for PanickingProbe {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn check(&self) -> AppResult<ProbeOutcome> {
            panic!("probe exploded");
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl HealthProbe for FailingProbe {
        fn name(&self) -> &str {
            "failing"
        }

        async fn check(&self) -> AppResult<ProbeOutcome> {
            Err(AppError::StoreUnavailable("connection reset".into()))
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl HealthProbe for HangingProbe {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn check(&self) -> AppResult<ProbeOutcome> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ProbeOutcome::healthy())
        }
    }

    fn fixed(name: &str, status: HealthStatus) -> Arc<dyn HealthProbe> {
        Arc::new(SelfTestProbe::new(name, status))
    }

    #[tokio::test]
    async fn test_one_unhealthy_probe_makes_overall_unhealthy() {
        let aggregator = HealthAggregator::builder()
            .probe(fixed("store", HealthStatus::Healthy))
            .probe(fixed("external", HealthStatus::Unhealthy))
            .probe(fixed("self_test", HealthStatus::Healthy))
            .build()
            .unwrap();

        let report = aggregator.run().await;

        assert_eq!(report.status, HealthStatus::Unhealthy);
        let names: Vec<_> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["store", "external", "self_test"]);
    }

    #[tokio::test]
    async fn test_panicking_probe_still_yields_every_report() {
        let aggregator = HealthAggregator::builder()
            .probe(fixed("a", HealthStatus::Healthy))
            .probe(Arc::new(PanickingProbe))
            .probe(fixed("b", HealthStatus::Degraded))
            .probe(Arc::new(FailingProbe))
            .build()
            .unwrap();

        let report = aggregator.run().await;

        assert_eq!(report.entries.len(), 4);
        assert_eq!(report.status, HealthStatus::Unhealthy);

        let panicked = &report.entries[1];
        assert_eq!(panicked.status, HealthStatus::Unhealthy);
        assert!(panicked.description.as_deref().unwrap().contains("probe exploded"));

        let failed = &report.entries[3];
        assert_eq!(failed.status, HealthStatus::Unhealthy);
        assert!(failed.description.as_deref().unwrap().contains("connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_unhealthy() {
        let aggregator = HealthAggregator::builder()
            .probe(Arc::new(HangingProbe))
            .probe(fixed("self_test", HealthStatus::Healthy))
            .probe_timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        let report = aggregator.run().await;

        assert_eq!(report.entries[0].status, HealthStatus::Unhealthy);
        assert_eq!(report.entries[1].status, HealthStatus::Healthy);
        assert!(report.total_duration < Duration::from_secs(1));
    }

    #[test]
    fn test_malformed_registration_is_rejected() {
        assert!(HealthAggregator::builder().build().is_err());

        let duplicate = HealthAggregator::builder()
            .probe(fixed("store", HealthStatus::Healthy))
            .probe(fixed("store", HealthStatus::Healthy))
            .build();
        assert!(matches!(duplicate, Err(AppError::Unexpected(msg)) if msg.contains("store")));

        assert!(HealthAggregator::builder().probe(fixed(" ", HealthStatus::Healthy)).build().is_err());
    }
}
