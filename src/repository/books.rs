//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let copies = book.total_copies.unwrap_or(1);

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, total_copies, available_copies)
            VALUES ($1, $2, $3, $3)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book.
    ///
    /// When total_copies changes, the number of copies currently out on loan
    /// stays constant: available = new_total - borrowed. Shrinking below the
    /// borrowed count is a conflict.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let title = update.title.as_deref().unwrap_or(&book.title);
        let author = update.author.as_deref().unwrap_or(&book.author);

        let borrowed = book.total_copies - book.available_copies;
        let total = update.total_copies.unwrap_or(book.total_copies);
        if total < borrowed {
            return Err(AppError::Conflict(format!(
                "Cannot reduce to {} copies: {} currently borrowed",
                total, borrowed
            )));
        }
        let available = total - borrowed;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, total_copies = $4, available_copies = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(author)
        .bind(total)
        .bind(available)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book. Fails while approved requests still reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let outstanding: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE book_id = $1 AND status = 'approved')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if outstanding {
            return Err(AppError::Conflict(
                "Book has outstanding approved borrow requests".to_string(),
            ));
        }

        sqlx::query("DELETE FROM borrow_requests WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
