//! # Entity CRUD Handlers
//!
//! 모든 [`Entity`] 타입이 공유하는 제네릭 CRUD 핸들러입니다.
//! 각 핸들러는 레지스트리에서 해당 엔티티의 캐시 계층([`EntityCache`])을 꺼내 사용하므로,
//! 읽기는 캐시를 먼저 거치고 쓰기는 성공 시 캐시 항목을 무효화합니다.
//!
//! | 메서드 | 경로 | 동작 | 상태 코드 |
//! |--------|------|------|-----------|
//! | `GET` | `/api/v1/{entities}` | 전체 목록 (캐시 우회) | 200 OK |
//! | `GET` | `/api/v1/{entities}/{id}` | 단건 조회 (캐시 우선) | 200 OK / 404 |
//! | `POST` | `/api/v1/{entities}` | 생성 | 201 Created |
//! | `PUT` | `/api/v1/{entities}` | 수정 (본문의 `id` 기준) | 200 OK / 404 |
//! | `DELETE` | `/api/v1/{entities}/{id}` | 삭제 | 204 No Content |
//!
//! 라우트 매크로는 제네릭 함수에 쓸 수 없으므로 `routes`에서 `web::resource`로 등록합니다.

use actix_web::{web, HttpResponse};
use log::info;

use crate::caching::EntityCache;
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceRegistry;
use crate::domain::entities::Entity;
use crate::repositories::KeyedStore;

fn cache_of<E: Entity>(registry: &ServiceRegistry) -> AppResult<std::sync::Arc<EntityCache<E>>> {
    registry.resolve::<EntityCache<E>>()
}

pub async fn list<E: Entity>(registry: web::Data<ServiceRegistry>) -> AppResult<HttpResponse> {
    let items = cache_of::<E>(&registry)?.get_all().await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_by_id<E: Entity>(
    registry: web::Data<ServiceRegistry>,
    id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();

    match cache_of::<E>(&registry)?.get_by_id(&id).await? {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Err(AppError::NotFound(format!("{} {} not found", E::NAME, id))),
    }
}

pub async fn create<E: Entity>(
    registry: web::Data<ServiceRegistry>,
    payload: web::Json<E>,
) -> AppResult<HttpResponse> {
    let item = payload.into_inner();
    item.validate()?;

    cache_of::<E>(&registry)?.add(item.clone()).await?;
    info!("➕ {} {} created", E::NAME, item.id());
    Ok(HttpResponse::Created().json(item))
}

pub async fn update<E: Entity>(
    registry: web::Data<ServiceRegistry>,
    payload: web::Json<E>,
) -> AppResult<HttpResponse> {
    let item = payload.into_inner();
    item.validate()?;

    cache_of::<E>(&registry)?.update(item.clone()).await?;
    info!("✏️ {} {} updated", E::NAME, item.id());
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete<E: Entity>(
    registry: web::Data<ServiceRegistry>,
    id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();

    cache_of::<E>(&registry)?.delete(&id).await?;
    info!("🗑️ {} {} deleted", E::NAME, id);
    Ok(HttpResponse::NoContent().finish())
}
