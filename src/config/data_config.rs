//! 데이터 및 서버 설정 관리 모듈
//!
//! 서버, 요청 제한, 저장소, 캐시 관련 설정을 관리합니다.
//! 각 설정은 `from_env()`로 프로세스 환경에서 읽거나,
//! `from_source()`에 조회 함수를 넘겨 환경과 무관하게 생성할 수 있습니다.

use std::env;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;

use log::error;

/// 환경 변수 조회 함수 (`key → value`)
pub trait ConfigSource: Fn(&str) -> Option<String> {}

impl<F: Fn(&str) -> Option<String>> ConfigSource for F {}

/// 프로세스 환경 변수 조회
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// 값이 없으면 기본값, 파싱에 실패하면 에러 로그 후 기본값을 사용합니다.
pub(crate) fn parse_or<T>(source: &impl ConfigSource, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match source(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            error!("{} 파싱 실패: {}. 기본값 {} 사용", key, e, default);
            default
        }),
    }
}

/// 애플리케이션 실행 환경 (`ENVIRONMENT`, 기본값 `Production`)
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경
    Development,
    /// 테스트 환경
    Test,
    /// 스테이징 환경
    Staging,
    /// 프로덕션 환경
    Production,
}

impl Environment {
    /// 대소문자 무관하게 환경 이름을 해석합니다. 알 수 없는 값은 `Production`입니다.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// 서버 바인딩 설정
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// 기본값: 127.0.0.1
    pub host: String,
    /// 기본값: 8080
    pub port: u16,
    /// 워커 스레드 수. 기본값: 4
    pub workers: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self {
            host: source("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(source, "PORT", 8080),
            workers: parse_or(source, "WORKERS", 4),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// 초당 허용 요청 수. 기본값: 100
    pub per_second: u64,
    /// 버스트 허용량. 기본값: 200
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self {
            per_second: parse_or(source, "RATE_LIMIT_PER_SECOND", 100),
            burst_size: parse_or(source, "RATE_LIMIT_BURST_SIZE", 200),
        }
    }
}

/// 저장소 백엔드 종류
///
/// `Debug`와 `Display` 모두 접속 URI(자격 증명 포함 가능)를 출력하지 않습니다.
#[derive(Clone, PartialEq)]
pub enum StoreBackend {
    /// 프로세스 메모리 (기본값)
    Memory,
    /// MongoDB
    Mongo { uri: String, database_name: String },
}

impl fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("Memory"),
            StoreBackend::Mongo { database_name, .. } => f
                .debug_struct("Mongo")
                .field("uri", &"<redacted>")
                .field("database_name", database_name)
                .finish(),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Mongo { database_name, .. } => write!(f, "mongo (database: {})", database_name),
        }
    }
}

/// 저장소 설정
///
/// ```bash
/// STORE_BACKEND=mongo
/// MONGODB_URI="mongodb://localhost:27017"
/// DATABASE_NAME="catalog"
/// STORE_CALL_TIMEOUT_MS=5000
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// 모든 저장소 호출에 적용되는 제한 시간
    pub call_timeout: Duration,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        let backend = match source("STORE_BACKEND").map(|b| b.to_lowercase()).as_deref() {
            Some("mongo") | Some("mongodb") => StoreBackend::Mongo {
                uri: source("MONGODB_URI")
                    .unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
                database_name: source("DATABASE_NAME").unwrap_or_else(|| "catalog".to_string()),
            },
            Some("memory") | None => StoreBackend::Memory,
            Some(other) => {
                error!("알 수 없는 STORE_BACKEND: {}. memory 사용", other);
                StoreBackend::Memory
            }
        };

        Self {
            backend,
            call_timeout: Duration::from_millis(parse_or(source, "STORE_CALL_TIMEOUT_MS", 5000)),
        }
    }
}

/// 캐시 설정
///
/// 엔티티별 TTL은 `CACHE_TTL_<ENTITY>_SECS`로 덮어쓸 수 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub books_ttl: Duration,
    pub authors_ttl: Duration,
    pub employees_ttl: Duration,
    /// `None`이면 스위퍼를 띄우지 않습니다.
    pub sweep_interval: Option<Duration>,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        let default_secs: u64 = parse_or(source, "CACHE_TTL_SECS", 60);
        let ttl_for = |entity: &str| {
            Duration::from_secs(parse_or(source, &format!("CACHE_TTL_{}_SECS", entity), default_secs))
        };

        let sweep_secs: u64 = parse_or(source, "CACHE_SWEEP_INTERVAL_SECS", 30);

        Self {
            default_ttl: Duration::from_secs(default_secs),
            books_ttl: ttl_for("BOOKS"),
            authors_ttl: ttl_for("AUTHORS"),
            employees_ttl: ttl_for("EMPLOYEES"),
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
        }
    }

    /// 엔티티 설정 키(`BOOKS` 등)에 해당하는 TTL
    pub fn ttl_for(&self, config_key: &str) -> Duration {
        match config_key {
            "BOOKS" => self.books_ttl,
            "AUTHORS" => self.authors_ttl,
            "EMPLOYEES" => self.employees_ttl,
            _ => self.default_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl ConfigSource {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("TEST"), Environment::Test);
        assert_eq!(Environment::parse("unknown"), Environment::Production);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_source(&source(&[]));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_invalid_number_falls_back_to_default() {
        let config = RateLimitConfig::from_source(&source(&[
            ("RATE_LIMIT_PER_SECOND", "lots"),
            ("RATE_LIMIT_BURST_SIZE", "50"),
        ]));
        assert_eq!(config.per_second, 100);
        assert_eq!(config.burst_size, 50);
    }

    #[test]
    fn test_store_backend_selection() {
        assert_eq!(StoreConfig::from_source(&source(&[])).backend, StoreBackend::Memory);

        let config = StoreConfig::from_source(&source(&[
            ("STORE_BACKEND", "Mongo"),
            ("DATABASE_NAME", "library"),
            ("STORE_CALL_TIMEOUT_MS", "250"),
        ]));
        assert_eq!(
            config.backend,
            StoreBackend::Mongo {
                uri: "mongodb://localhost:27017".into(),
                database_name: "library".into(),
            }
        );
        assert_eq!(config.call_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_store_backend_formatting_hides_uri() {
        let config = StoreConfig::from_source(&source(&[
            ("STORE_BACKEND", "mongo"),
            ("MONGODB_URI", "mongodb://admin:hunter2@db:27017"),
        ]));

        let shown = format!("{} {:?} {:?}", config.backend, config.backend, config);
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("admin"));
        assert!(shown.contains("catalog"));
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }

    #[test]
    fn test_cache_ttl_overrides() {
        let config = CacheConfig::from_source(&source(&[
            ("CACHE_TTL_SECS", "90"),
            ("CACHE_TTL_BOOKS_SECS", "120"),
            ("CACHE_SWEEP_INTERVAL_SECS", "0"),
        ]));
        assert_eq!(config.ttl_for("BOOKS"), Duration::from_secs(120));
        assert_eq!(config.ttl_for("AUTHORS"), Duration::from_secs(90));
        assert_eq!(config.sweep_interval, None);
    }
}
