//! API 라우트 설정 모듈
//!
//! 엔티티별 CRUD 라우트와 헬스체크 엔드포인트를 등록합니다.
//!
//! # Routes
//!
//! | 경로 | 메서드 |
//! |------|--------|
//! | `/health` | `GET` |
//! | `/api/v1/books` | `GET`, `POST`, `PUT` |
//! | `/api/v1/books/{id}` | `GET`, `DELETE` |
//! | `/api/v1/authors` | `GET`, `POST`, `PUT` |
//! | `/api/v1/authors/{id}` | `GET`, `DELETE` |
//! | `/api/v1/employees` | `GET`, `POST`, `PUT` |
//! | `/api/v1/employees/{id}` | `GET`, `DELETE` |
//!
//! 본문 JSON이나 경로 `id`를 해석하지 못하면 `ValidationFailed`로 응답합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//!
//! let app = App::new()
//!     .app_data(web::Data::from(registry))
//!     .wrap(ErrorTranslator)
//!     .configure(configure_all_routes);
//! ```

use actix_web::{error, web, HttpRequest};
use log::debug;

use crate::core::errors::AppError;
use crate::domain::entities::{Author, Book, Employee, Entity};
use crate::handlers;

/// 모든 라우트를 설정합니다
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    // Health check endpoint
    cfg.service(handlers::health::health_check);

    configure_book_routes(cfg);
    configure_entity_routes::<Author>(cfg);
    configure_entity_routes::<Employee>(cfg);
}

/// 도서 라우트
///
/// 생성/수정은 저자 검증을 위해 `BookService`를 거치고, 나머지는 제네릭 핸들러를 사용합니다.
///
/// ```bash
/// curl http://localhost:8080/api/v1/books/5
/// ```
fn configure_book_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(&scope_path::<Book>())
            .service(handlers::books::create_book)
            .service(handlers::books::update_book)
            .service(web::resource("").route(web::get().to(handlers::entities::list::<Book>)))
            .service(item_resource::<Book>()),
    );
}

/// 제네릭 CRUD 라우트 (`/api/v1/{E::NAME}`)
fn configure_entity_routes<E: Entity>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(&scope_path::<E>())
            .service(
                web::resource("")
                    .route(web::get().to(handlers::entities::list::<E>))
                    .route(web::post().to(handlers::entities::create::<E>))
                    .route(web::put().to(handlers::entities::update::<E>)),
            )
            .service(item_resource::<E>()),
    );
}

fn item_resource<E: Entity>() -> actix_web::Resource {
    web::resource("/{id}")
        .route(web::get().to(handlers::entities::get_by_id::<E>))
        .route(web::delete().to(handlers::entities::delete::<E>))
}

fn scope_path<E: Entity>() -> String {
    format!("/api/v1/{}", E::NAME)
}

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Unreadable JSON body on {}: {}", req.path(), err);
    AppError::field("body", "Request body could not be parsed").into()
}

fn path_error(_err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::field("id", "id must be an integer").into()
}
