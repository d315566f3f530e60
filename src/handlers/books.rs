//! 도서 쓰기 핸들러
//!
//! 도서 생성과 수정은 [`BookService`]를 거쳐 저자 존재 여부를 함께 검증합니다.
//! 조회와 삭제는 제네릭 핸들러([`super::entities`])를 그대로 사용합니다.

use actix_web::{post, put, web, HttpResponse};

use crate::core::errors::AppResult;
use crate::core::registry::ServiceRegistry;
use crate::domain::entities::Book;
use crate::services::BookService;

/// 도서 생성
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/books \
///   -H "Content-Type: application/json" \
///   -d '{"id":5,"title":"Dune","authorId":1,"releaseYear":1965}'
/// ```
#[post("")]
pub async fn create_book(
    registry: web::Data<ServiceRegistry>,
    payload: web::Json<Book>,
) -> AppResult<HttpResponse> {
    let book = payload.into_inner();
    registry.resolve::<BookService>()?.add_book(book.clone()).await?;
    Ok(HttpResponse::Created().json(book))
}

/// 도서 수정 (본문의 `id` 기준)
#[put("")]
pub async fn update_book(
    registry: web::Data<ServiceRegistry>,
    payload: web::Json<Book>,
) -> AppResult<HttpResponse> {
    let book = payload.into_inner();
    registry.resolve::<BookService>()?.update_book(book.clone()).await?;
    Ok(HttpResponse::Ok().json(book))
}
