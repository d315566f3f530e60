//! Book Entity

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Entity;
use crate::repositories::Keyed;

/// 도서 엔티티
///
/// `author_id`는 [`Author`](crate::domain::entities::Author)의 키를 참조하며,
/// 추가/수정 시 저자가 존재하는지 [`BookService`](crate::services::BookService)가 확인합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[validate(range(min = 1, message = "id는 1 이상이어야 합니다"))]
    pub id: i32,

    #[validate(length(min = 1, max = 200, message = "제목은 1-200자 사이여야 합니다"))]
    pub title: String,

    #[validate(range(min = 1, message = "authorId는 1 이상이어야 합니다"))]
    pub author_id: i32,

    #[validate(range(min = 1, max = 2100, message = "출판 연도가 올바르지 않습니다"))]
    pub release_year: i32,
}

impl Book {
    pub fn new(id: i32, title: impl Into<String>, author_id: i32, release_year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author_id,
            release_year,
        }
    }
}

impl Keyed for Book {
    type Key = i32;

    fn key(&self) -> i32 {
        self.id
    }
}

impl Entity for Book {
    const NAME: &'static str = "books";
    const CONFIG_KEY: &'static str = "BOOKS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Book::new(5, "Dune", 1, 1965)).unwrap();
        assert_eq!(json["authorId"], 1);
        assert_eq!(json["releaseYear"], 1965);
    }

    #[test]
    fn test_validation_rules() {
        assert!(Book::new(5, "Dune", 1, 1965).validate().is_ok());

        let errors = Book::new(0, "", 1, 1965).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("id"));
        assert!(fields.contains_key("title"));
    }
}
