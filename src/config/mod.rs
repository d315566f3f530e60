//! # Configuration Module
//!
//! 환경 변수 기반 설정을 중앙에서 관리합니다.
//! `.env.dev`, `.env.prod` 파일은 `PROFILE`에 따라 `main`에서 먼저 로드됩니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 서버, 요청 제한, 저장소, 캐시 설정
//! - [`health_config`] - 헬스 프로브 등록 목록과 임계값
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{CacheConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let cache = CacheConfig::from_env();
//! println!("bind {} / book ttl {:?}", server.bind_address(), cache.books_ttl);
//! ```
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 서버
//! export HOST="0.0.0.0"
//! export PORT="8080"
//! export WORKERS="4"
//!
//! # 저장소
//! export STORE_BACKEND="mongo"        # memory | mongo
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="catalog"
//!
//! # 캐시
//! export CACHE_TTL_SECS="60"
//! export CACHE_TTL_AUTHORS_SECS="300"
//! ```

pub mod data_config;
pub mod health_config;

pub use data_config::*;
pub use health_config::*;

use crate::core::errors::AppResult;

/// 시작 시 한 번 읽는 전체 설정
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub health: HealthConfig,
}

impl AppConfig {
    /// 프로세스 환경에서 설정을 읽습니다. 헬스 구성 오류는 치명적입니다.
    pub fn from_env() -> AppResult<Self> {
        Self::from_source(&process_env)
    }

    pub fn from_source(source: &impl ConfigSource) -> AppResult<Self> {
        Ok(Self {
            environment: source("ENVIRONMENT")
                .map(|env| Environment::parse(&env))
                .unwrap_or(Environment::Production),
            server: ServerConfig::from_source(source),
            rate_limit: RateLimitConfig::from_source(source),
            store: StoreConfig::from_source(source),
            cache: CacheConfig::from_source(source),
            health: HealthConfig::from_source(source)?,
        })
    }
}
