//! 헬스 체크 설정
//!
//! ```bash
//! HEALTH_PROBES="self_test,store,external"   # 기본값: 세 가지 모두
//! HEALTH_EXTERNAL_URL="https://google.com"
//! HEALTH_PROBE_TIMEOUT_MS=2000
//! HEALTH_DEGRADED_THRESHOLD_MS=1000
//! HEALTH_SELF_TEST_STATUS=healthy            # healthy | degraded | unhealthy
//! ```
//!
//! 프로브 목록이 잘못된 경우(알 수 없는 이름, 중복, 빈 목록, 잘못된 URL)는
//! 시작 시 치명적인 구성 오류입니다.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use crate::config::data_config::{parse_or, process_env, ConfigSource};
use crate::core::errors::{AppError, AppResult};
use crate::health::HealthStatus;

/// 등록 가능한 내장 프로브 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    SelfTest,
    Store,
    External,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [ProbeKind::SelfTest, ProbeKind::Store, ProbeKind::External];

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::SelfTest => "self_test",
            ProbeKind::Store => "store",
            ProbeKind::External => "external",
        }
    }
}

impl FromStr for ProbeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "self_test" | "selftest" | "test" => Ok(ProbeKind::SelfTest),
            "store" => Ok(ProbeKind::Store),
            "external" => Ok(ProbeKind::External),
            other => Err(config_error(format!("unknown health probe '{}'", other))),
        }
    }
}

fn config_error(message: String) -> AppError {
    AppError::Unexpected(format!("Invalid health configuration: {}", message))
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthConfig {
    /// 등록 순서대로의 프로브 목록 (중복 없음)
    pub probes: Vec<ProbeKind>,
    pub external_url: String,
    pub probe_timeout: Duration,
    /// 외부 의존성 응답이 이 시간보다 느리면 `Degraded`
    pub degraded_threshold: Duration,
    pub self_test_status: HealthStatus,
}

impl HealthConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> AppResult<Self> {
        let probes = match source("HEALTH_PROBES") {
            Some(list) => parse_probe_list(&list)?,
            None => ProbeKind::ALL.to_vec(),
        };

        let external_url =
            source("HEALTH_EXTERNAL_URL").unwrap_or_else(|| "https://google.com".to_string());
        if probes.contains(&ProbeKind::External) {
            reqwest::Url::parse(&external_url)
                .map_err(|e| config_error(format!("HEALTH_EXTERNAL_URL '{}': {}", external_url, e)))?;
        }

        let self_test_status = match source("HEALTH_SELF_TEST_STATUS") {
            Some(raw) => raw.parse()?,
            None => HealthStatus::Healthy,
        };

        Ok(Self {
            probes,
            external_url,
            probe_timeout: Duration::from_millis(parse_or(source, "HEALTH_PROBE_TIMEOUT_MS", 2000)),
            degraded_threshold: Duration::from_millis(parse_or(
                source,
                "HEALTH_DEGRADED_THRESHOLD_MS",
                1000,
            )),
            self_test_status,
        })
    }
}

/// 쉼표로 구분된 프로브 목록을 해석합니다.
pub fn parse_probe_list(list: &str) -> AppResult<Vec<ProbeKind>> {
    let mut seen = HashSet::new();
    let mut probes = Vec::new();

    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let kind: ProbeKind = name.parse()?;
        if !seen.insert(kind) {
            return Err(config_error(format!("duplicate health probe '{}'", kind.as_str())));
        }
        probes.push(kind);
    }

    if probes.is_empty() {
        return Err(config_error("HEALTH_PROBES is empty".to_string()));
    }
    Ok(probes)
}
