//! # 애플리케이션 구성
//!
//! 시작 시 한 번 실행되어 저장소, 캐시 계층, 서비스, 헬스 집계기를 만들고
//! [`ServiceRegistry`]에 등록합니다.
//!
//! ```text
//! AppConfig
//!    │
//!    ├─▶ Keyed Store (memory | mongo*) ──▶ CachedStore<Book|Author|Employee>  (Lifecycle)
//!    │                                          │
//!    │                                          └─▶ BookService
//!    │
//!    └─▶ HealthAggregator (self_test, store, external)
//! ```
//!
//! `*` MongoDB 저장소도 생명주기 컴포넌트이며 캐시보다 먼저 초기화됩니다.
//! 등록 순서가 곧 초기화 순서이며, 종료는 역순입니다.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::caching::{CacheSweeper, CachedStore, EntityCache};
use crate::config::{AppConfig, CacheConfig, HealthConfig, ProbeKind, StoreBackend};
use crate::core::errors::AppResult;
use crate::core::registry::ServiceRegistry;
use crate::db::Database;
use crate::domain::entities::{Author, Book, Employee, Entity};
use crate::health::{
    ExternalDependencyProbe, HealthAggregator, HealthProbe, SelfTestProbe, StoreConnectivityProbe,
};
use crate::repositories::memory::InMemoryStore;
use crate::repositories::mongo::MongoStore;
use crate::repositories::{ConnectionCheck, KeyedStore};
use crate::services::BookService;

/// 구성이 끝난 애플리케이션 상태
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    /// 캐시 만료 항목 정리기 (`main`에서 띄움)
    pub sweeper: CacheSweeper,
}

struct Stores {
    connection: Arc<dyn ConnectionCheck>,
    books: Arc<dyn KeyedStore<i32, Book>>,
    authors: Arc<dyn KeyedStore<i32, Author>>,
    employees: Arc<dyn KeyedStore<i32, Employee>>,
}

/// 설정에 따라 모든 컴포넌트를 만들고 레지스트리에 등록합니다.
///
/// # Errors
///
/// * `StoreUnavailable` - MongoDB 연결 실패
/// * `Unexpected` - 헬스 프로브 구성 오류
pub async fn build_state(config: &AppConfig) -> AppResult<AppState> {
    let registry = Arc::new(ServiceRegistry::new());

    let stores = match &config.store.backend {
        StoreBackend::Memory => {
            info!("🗄️ Using in-memory keyed stores");
            let books = Arc::new(InMemoryStore::<i32, Book>::new(Book::NAME));
            Stores {
                connection: books.clone(),
                books,
                authors: memory_store::<Author>(),
                employees: memory_store::<Employee>(),
            }
        }
        StoreBackend::Mongo { uri, database_name } => {
            info!("📡 데이터베이스 연결 중...");
            let database = Arc::new(Database::connect(uri, database_name).await?);
            registry.set(database.clone());
            Stores {
                connection: database.clone(),
                books: mongo_store::<Book>(&registry, &database),
                authors: mongo_store::<Author>(&registry, &database),
                employees: mongo_store::<Employee>(&registry, &database),
            }
        }
    };

    let call_timeout = config.store.call_timeout;
    let books = entity_cache(stores.books, &config.cache, call_timeout);
    let authors = entity_cache(stores.authors, &config.cache, call_timeout);
    let employees = entity_cache(stores.employees, &config.cache, call_timeout);

    registry.set_component(books.clone());
    registry.set_component(authors.clone());
    registry.set_component(employees.clone());

    let sweeper = CacheSweeper::new()
        .track(books.clone())
        .track(authors.clone())
        .track(employees.clone());

    registry.set(Arc::new(BookService::new(books, authors)));
    registry.set(Arc::new(build_aggregator(&config.health, stores.connection)?));

    Ok(AppState { registry, sweeper })
}

fn memory_store<E: Entity>() -> Arc<dyn KeyedStore<i32, E>> {
    Arc::new(InMemoryStore::<i32, E>::new(E::NAME))
}

/// 컬렉션 저장소를 만들고 생명주기 컴포넌트로 등록합니다 (`init`에서 `id` 고유 인덱스 생성).
fn mongo_store<E: Entity>(
    registry: &ServiceRegistry,
    database: &Arc<Database>,
) -> Arc<dyn KeyedStore<i32, E>> {
    let store = Arc::new(MongoStore::<E>::new(database.clone(), E::COLLECTION));
    registry.set_component(store.clone());
    store
}

fn entity_cache<E: Entity>(
    store: Arc<dyn KeyedStore<i32, E>>,
    config: &CacheConfig,
    call_timeout: Duration,
) -> Arc<EntityCache<E>> {
    let ttl = config.ttl_for(E::CONFIG_KEY);
    Arc::new(CachedStore::new(store, E::NAME, ttl).with_call_timeout(call_timeout))
}

/// 설정된 프로브 목록으로 헬스 집계기를 만듭니다.
pub fn build_aggregator(
    config: &HealthConfig,
    connection: Arc<dyn ConnectionCheck>,
) -> AppResult<HealthAggregator> {
    let mut builder = HealthAggregator::builder().probe_timeout(config.probe_timeout);

    for kind in &config.probes {
        let probe: Arc<dyn HealthProbe> = match kind {
            ProbeKind::SelfTest => {
                Arc::new(SelfTestProbe::new(kind.as_str(), config.self_test_status))
            }
            ProbeKind::Store => Arc::new(StoreConnectivityProbe::new(
                kind.as_str(),
                connection.clone(),
                config.probe_timeout,
            )),
            ProbeKind::External => Arc::new(ExternalDependencyProbe::new(
                kind.as_str(),
                config.external_url.clone(),
                config.probe_timeout,
                config.degraded_threshold,
            )?),
        };
        builder = builder.probe(probe);
    }

    let aggregator = builder.build()?;
    info!("🩺 Health probes registered: {:?}", aggregator.probe_names());
    Ok(aggregator)
}
