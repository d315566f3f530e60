//! # 도서 서비스
//!
//! 도서 쓰기 시 참조하는 저자가 실제로 존재하는지 확인합니다.
//! 저자 존재 여부는 캐시를 거치지 않고 항상 저장소에서 확인됩니다 (`exists`).

use std::sync::Arc;

use log::{info, warn};
use validator::Validate;

use crate::caching::EntityCache;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::{Author, Book};
use crate::repositories::KeyedStore;

pub struct BookService {
    books: Arc<EntityCache<Book>>,
    authors: Arc<EntityCache<Author>>,
}

impl BookService {
    pub fn new(books: Arc<EntityCache<Book>>, authors: Arc<EntityCache<Author>>) -> Self {
        Self { books, authors }
    }

    /// 저자를 확인한 뒤 도서를 추가합니다.
    ///
    /// # Errors
    ///
    /// * `ValidationFailed` - 입력 검증 실패, 존재하지 않는 저자, 중복 ID
    /// * `StoreUnavailable` - 저장소 장애
    pub async fn add_book(&self, book: Book) -> AppResult<()> {
        self.check(&book).await?;

        let id = book.id;
        self.books.add(book).await?;
        info!("📚 Book added: {}", id);
        Ok(())
    }

    /// 저자를 확인한 뒤 도서를 수정합니다. 캐시 항목은 성공 시 무효화됩니다.
    ///
    /// # Errors
    ///
    /// * `ValidationFailed` - 입력 검증 실패, 존재하지 않는 저자
    /// * `NotFound` - 수정할 도서가 없음
    pub async fn update_book(&self, book: Book) -> AppResult<()> {
        self.check(&book).await?;

        let id = book.id;
        self.books.update(book).await?;
        info!("📚 Book updated: {}", id);
        Ok(())
    }

    async fn check(&self, book: &Book) -> AppResult<()> {
        book.validate()?;

        if !self.authors.exists(&book.author_id).await? {
            warn!("Book {} references missing author {}", book.id, book.author_id);
            return Err(AppError::field(
                "authorId",
                format!("Author {} does not exist", book.author_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::CachedStore;
    use crate::core::errors::ErrorKind;
    use crate::repositories::memory::InMemoryStore;
    use std::time::Duration;

    fn service() -> (BookService, Arc<EntityCache<Book>>) {
        let book_store: Arc<dyn KeyedStore<i32, Book>> = Arc::new(InMemoryStore::new("books"));
        let author_store: Arc<dyn KeyedStore<i32, Author>> = Arc::new(InMemoryStore::with_items(
            "authors",
            vec![Author::new(1, "Frank Herbert", 65)],
        ));

        let ttl = Duration::from_secs(60);
        let books = Arc::new(CachedStore::new(book_store, "books", ttl));
        let authors = Arc::new(CachedStore::new(author_store, "authors", ttl));
        (BookService::new(books.clone(), authors), books)
    }

    #[tokio::test]
    async fn test_add_book_with_existing_author() {
        let (service, books) = service();

        service.add_book(Book::new(5, "Dune", 1, 1965)).await.unwrap();

        assert_eq!(books.get_by_id(&5).await.unwrap(), Some(Book::new(5, "Dune", 1, 1965)));
    }

    #[tokio::test]
    async fn test_missing_author_is_field_error() {
        let (service, books) = service();

        let err = service.add_book(Book::new(5, "Dune", 9, 1965)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(err.field_errors().unwrap().contains_key("authorId"));
        assert!(!books.exists(&5).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_book() {
        let (service, books) = service();
        service.add_book(Book::new(5, "Dune", 1, 1965)).await.unwrap();
        books.get_by_id(&5).await.unwrap();

        service.update_book(Book::new(5, "Dune Messiah", 1, 1969)).await.unwrap();

        let book = books.get_by_id(&5).await.unwrap().unwrap();
        assert_eq!(book.title, "Dune Messiah");
    }

    #[tokio::test]
    async fn test_update_missing_book_is_not_found() {
        let (service, _) = service();

        let err = service.update_book(Book::new(8, "Ghost", 1, 2000)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
