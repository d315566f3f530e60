//! # Service Registry
//!
//! 프로세스 시작 시 한 번 구성되는 타입 기반 서비스 레지스트리입니다.
//!
//! 전역 정적 변수 없이 `Arc<ServiceRegistry>` 하나를 모든 요청 처리 컨텍스트에
//! 전달하며(`web::Data`), 핸들러는 [`ServiceRegistry::resolve`]로
//! 필요한 컴포넌트를 타입으로 조회합니다.
//!
//! 생명주기가 있는 컴포넌트([`Lifecycle`])는 등록 순서대로 초기화되고,
//! 종료 시에는 역순으로 정리됩니다.
//!
//! ```rust,ignore
//! let registry = Arc::new(ServiceRegistry::new());
//! registry.set_component(book_cache.clone());
//! registry.set(Arc::new(book_service));
//! registry.initialize_all().await?;
//!
//! let books = registry.resolve::<EntityCache<Book>>()?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::{info, warn};

use crate::core::errors::{AppError, AppResult};
use crate::utils::display_terminal::{
    print_boxed_title, print_final_summary, print_step_complete, print_step_start, print_sub_task,
};

/// 초기화/종료 순서가 필요한 컴포넌트
#[async_trait]
pub trait Lifecycle: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn shutdown(&self) {}
}

/// 타입 기반 의존성 레지스트리
pub struct ServiceRegistry {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    components: RwLock<Vec<Arc<dyn Lifecycle>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            components: RwLock::new(Vec::new()),
        }
    }

    /// 인스턴스를 타입 키로 등록합니다. 같은 타입이 이미 있으면 교체합니다.
    pub fn set<T: Send + Sync + 'static>(&self, instance: Arc<T>) {
        let clean_name = Self::extract_clean_type_name(std::any::type_name::<T>());

        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        if instances.insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>).is_some() {
            warn!("📦 Replacing registration: {}", clean_name);
        } else {
            info!("📦 Registering: {}", clean_name);
        }
    }

    /// 생명주기 컴포넌트로 등록합니다.
    ///
    /// 타입 조회가 가능하도록 [`ServiceRegistry::set`]도 함께 수행되며,
    /// 초기화 순서는 이 메서드의 호출 순서를 따릅니다.
    pub fn set_component<T: Lifecycle + 'static>(&self, instance: Arc<T>) {
        self.set(instance.clone());
        self.components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(instance as Arc<dyn Lifecycle>);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let instances = self.instances.read().unwrap_or_else(PoisonError::into_inner);
        instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 등록된 인스턴스를 조회합니다.
    ///
    /// 등록되지 않은 타입은 구성 오류이므로 `Unexpected`로 보고됩니다.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> AppResult<Arc<T>> {
        self.get::<T>().ok_or_else(|| {
            AppError::Unexpected(format!(
                "Service not registered: {}",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn components_snapshot(&self) -> Vec<Arc<dyn Lifecycle>> {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 등록 순서대로 모든 생명주기 컴포넌트를 초기화합니다.
    ///
    /// 하나라도 실패하면 즉시 중단하고 에러를 반환합니다 (시작 시 치명적 오류).
    pub async fn initialize_all(&self) -> AppResult<()> {
        print_boxed_title("🔄 INITIALIZING SERVICE REGISTRY");

        let components = self.components_snapshot();
        print_step_start(1, "Initializing components");

        for component in &components {
            print_sub_task(component.name(), "Initializing...");
            component.init().await.map_err(|e| {
                AppError::Unexpected(format!("Failed to initialize {}: {}", component.name(), e))
            })?;
            print_sub_task(component.name(), "✓ Ready");
        }

        print_step_complete(1, "Components initialized", components.len());
        print_final_summary(components.len(), self.len());
        Ok(())
    }

    /// 등록의 역순으로 모든 컴포넌트를 종료합니다.
    pub async fn shutdown_all(&self) {
        let components = self.components_snapshot();
        for component in components.iter().rev() {
            info!("🛑 Shutting down: {}", component.name());
            component.shutdown().await;
        }
    }

    fn extract_clean_type_name(type_name: &str) -> String {
        let base = type_name.split('<').next().unwrap_or(type_name);
        match base.rfind("::") {
            Some(pos) => base[pos + 2..].to_string(),
            None => base.to_string(),
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Lifecycle for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn init(&self) -> AppResult<()> {
            self.log.lock().unwrap().push(format!("init:{}", self.name));
            Ok(())
        }

        async fn shutdown(&self) {
            self.log.lock().unwrap().push(format!("shutdown:{}", self.name));
        }
    }

    struct Failing;

    #[async_trait]
    impl Lifecycle for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn init(&self) -> AppResult<()> {
            Err(AppError::StoreUnavailable("no connection".into()))
        }
    }

    #[test]
    fn test_set_and_resolve() {
        let registry = ServiceRegistry::new();
        registry.set(Arc::new(42u32));

        assert_eq!(*registry.resolve::<u32>().unwrap(), 42);
        assert!(registry.contains::<u32>());
        assert!(registry.get::<String>().is_none());
        assert!(matches!(registry.resolve::<String>(), Err(AppError::Unexpected(_))));
    }

    #[test]
    fn test_extract_clean_type_name() {
        assert_eq!(
            ServiceRegistry::extract_clean_type_name("crate::caching::CachedStore<i32, crate::Book>"),
            "CachedStore"
        );
        assert_eq!(ServiceRegistry::extract_clean_type_name("u32"), "u32");
    }

    #[tokio::test]
    async fn test_lifecycle_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ServiceRegistry::new();

        registry.set_component(Arc::new(Recorder { name: "first".into(), log: log.clone() }));
        // 같은 타입은 하나만 조회되지만 생명주기 목록에는 둘 다 남는다
        registry.set_component(Arc::new(Recorder { name: "second".into(), log: log.clone() }));

        registry.initialize_all().await.unwrap();
        registry.shutdown_all().await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["init:first", "init:second", "shutdown:second", "shutdown:first"]
        );
    }

    #[tokio::test]
    async fn test_failing_component_aborts_initialization() {
        let registry = ServiceRegistry::new();
        registry.set_component(Arc::new(Failing));

        let result = registry.initialize_all().await;
        assert!(matches!(result, Err(AppError::Unexpected(msg)) if msg.contains("failing")));
    }
}
