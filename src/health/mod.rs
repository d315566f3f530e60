//! # Health Module
//!
//! 서비스가 제 역할을 할 수 있는지 오케스트레이션/모니터링 시스템에 알려줍니다.
//!
//! ```text
//! GET /health
//!     │
//!     ▼
//! ┌──────────────────────┐
//! │   HealthAggregator   │  프로브 동시 실행, 최악 상태로 집계
//! └──────────────────────┘
//!     │         │         │
//!     ▼         ▼         ▼
//!  self_test   store    external
//!  (고정값)    (ping)   (HEAD 요청)
//! ```
//!
//! 개별 프로브의 실패(에러, 패닉, 제한 시간 초과)는 집계를 중단시키지 않고
//! `Unhealthy` 보고서로 변환됩니다. 보고서는 매 호출마다 새로 만들어지며 캐시되지 않습니다.

pub mod aggregator;
pub mod probes;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::core::errors::{AppError, AppResult};

pub use aggregator::{HealthAggregator, HealthAggregatorBuilder};
pub use probes::{ExternalDependencyProbe, SelfTestProbe, StoreConnectivityProbe};

/// 3단계 상태. 순서는 심각도이며 `Healthy < Degraded < Unhealthy`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Unhealthy => "Unhealthy",
        }
    }

    /// 가장 심각한 상태. 비어 있으면 `Healthy`입니다.
    pub fn worst(statuses: impl IntoIterator<Item = HealthStatus>) -> HealthStatus {
        statuses.into_iter().max().unwrap_or(HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "degraded" => Ok(HealthStatus::Degraded),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            other => Err(AppError::Unexpected(format!("unknown health status '{}'", other))),
        }
    }
}

/// 프로브 한 번의 판정 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub status: HealthStatus,
    pub description: Option<String>,
}

impl ProbeOutcome {
    pub fn healthy() -> Self {
        Self { status: HealthStatus::Healthy, description: None }
    }

    pub fn degraded(description: impl Into<String>) -> Self {
        Self { status: HealthStatus::Degraded, description: Some(description.into()) }
    }

    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self { status: HealthStatus::Unhealthy, description: Some(description.into()) }
    }
}

/// 이름이 있는 독립 실행 가능한 점검
///
/// `check`가 `Err`를 반환하거나 패닉하면 집계기가 `Unhealthy`로 변환합니다.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> AppResult<ProbeOutcome>;
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_micros() as f64 / 1000.0)
}

/// 프로브 하나의 보고서 (`duration`은 밀리초)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub name: String,
    pub status: HealthStatus,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl HealthReport {
    pub fn new(name: impl Into<String>, outcome: ProbeOutcome, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: outcome.status,
            description: outcome.description,
            duration,
        }
    }
}

/// 집계 보고서
///
/// ```json
/// {
///   "status": "Unhealthy",
///   "totalDuration": 12.5,
///   "checkedAt": "2024-05-01T10:00:00Z",
///   "entries": [
///     { "name": "self_test", "status": "Healthy", "description": null, "duration": 0.01 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateHealthReport {
    pub status: HealthStatus,
    #[serde(serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    pub checked_at: DateTime<Utc>,
    pub entries: Vec<HealthReport>,
}

impl AggregateHealthReport {
    /// 항목들로부터 전체 상태를 계산합니다.
    pub fn from_entries(entries: Vec<HealthReport>, total_duration: Duration) -> Self {
        Self {
            status: HealthStatus::worst(entries.iter().map(|entry| entry.status)),
            total_duration,
            checked_at: Utc::now(),
            entries,
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == HealthStatus::Unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, status: HealthStatus) -> HealthReport {
        let outcome = ProbeOutcome { status, description: None };
        HealthReport::new(name, outcome, Duration::from_millis(3))
    }

    #[test]
    fn test_worst_status_dominates() {
        let aggregate = AggregateHealthReport::from_entries(
            vec![
                report("store", HealthStatus::Healthy),
                report("external", HealthStatus::Unhealthy),
                report("self_test", HealthStatus::Healthy),
            ],
            Duration::from_millis(5),
        );
        assert_eq!(aggregate.status, HealthStatus::Unhealthy);

        assert_eq!(
            HealthStatus::worst([HealthStatus::Healthy, HealthStatus::Degraded]),
            HealthStatus::Degraded
        );
        assert_eq!(HealthStatus::worst([]), HealthStatus::Healthy);
    }

    #[test]
    fn test_report_serialization() {
        let aggregate = AggregateHealthReport::from_entries(
            vec![report("store", HealthStatus::Degraded)],
            Duration::from_millis(4),
        );
        let json = serde_json::to_value(&aggregate).unwrap();

        assert_eq!(json["status"], "Degraded");
        assert_eq!(json["totalDuration"], 4.0);
        assert_eq!(json["entries"][0]["name"], "store");
        assert_eq!(json["entries"][0]["duration"], 3.0);
        assert!(json["entries"][0]["description"].is_null());
        assert!(json["checkedAt"].is_string());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Degraded".parse::<HealthStatus>().unwrap(), HealthStatus::Degraded);
        assert!("sick".parse::<HealthStatus>().is_err());
    }
}
