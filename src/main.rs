//! 카탈로그 서비스 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 모든 서비스를 초기화합니다.
//! 저장소 위에 캐시 계층을 구성하고, 헬스 집계와 에러 변환 미들웨어를 포함한
//! REST API를 제공합니다.

use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use catalog_service_backend::app::{build_state, AppState};
use catalog_service_backend::config::{AppConfig, RateLimitConfig, ServerConfig};
use catalog_service_backend::core::errors::CORRELATION_ID_HEADER;
use catalog_service_backend::core::registry::ServiceRegistry;
use catalog_service_backend::handlers;
use catalog_service_backend::middlewares::ErrorTranslator;
use catalog_service_backend::routes::configure_all_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 카탈로그 서비스 시작중...");

    // 설정 오류는 시작 시점에 치명적
    let config = AppConfig::from_env().map_err(startup_error)?;
    info!("Environment: {:?}, store: {}", config.environment, config.store.backend);

    let AppState { registry, sweeper } = build_state(&config).await.map_err(startup_error)?;

    // 모든 서비스 초기화
    registry.initialize_all().await.map_err(startup_error)?;
    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    let sweeper = config.cache.sweep_interval.map(|every| sweeper.spawn(every));

    // HTTP 서버 시작
    let result = start_http_server(&config.server, &config.rate_limit, registry.clone()).await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    registry.shutdown_all().await;
    info!("👋 서비스 종료");

    result
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    error!("❌ 시작 실패: {}", e);
    std::io::Error::other(e.to_string())
}

/// HTTP 서버를 구성하고 실행합니다
///
/// 미들웨어는 바깥쪽부터 Rate Limiting, CORS, 접근 로그, 경로 정규화, 에러 변환 순서로
/// 요청을 통과합니다. 에러 변환이 가장 안쪽에 있으므로 다른 미들웨어는 변환된 응답을 봅니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(
    server: &ServerConfig,
    rate_limit: &RateLimitConfig,
    registry: Arc<ServiceRegistry>,
) -> std::io::Result<()> {
    let bind_address = server.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API: http://{}/api/v1/{{books|authors|employees}}", bind_address);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| startup_error("invalid rate limit configuration"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    let registry = web::Data::from(registry);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(ErrorTranslator)
            .configure(configure_all_routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind(bind_address)?
    .workers(server.workers)
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// `RUST_LOG`가 없으면 `info,actix_web=info`를 사용합니다.
///
/// ```bash
/// # 캐시 hit/miss 로그까지 보기
/// RUST_LOG=catalog_service_backend::caching=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

/// CORS 설정을 구성합니다
///
/// 로컬 프론트엔드 개발 서버와 자체 서버의 Origin을 허용합니다.
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![
            header::HeaderName::from_static(CORRELATION_ID_HEADER),
            header::RETRY_AFTER,
        ])
        .max_age(3600)
}
