//! Catalog management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        self.repository.books.update(id, &update).await
    }

    /// Delete a book. Conflicts while copies are out on loan.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
