//! Borrow requests repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrow_request::{BorrowRequest, BorrowRequestDetails, RequestStatus},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Create a pending borrow request.
    ///
    /// The book row is locked so the availability check holds until commit;
    /// stock is only decremented at approval time.
    pub async fn create(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if available == 0 {
            return Err(AppError::Conflict(
                "No copies of this book are available".to_string(),
            ));
        }

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (user_id, book_id, status, requested_at)
            VALUES ($1, $2, 'pending', $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Approve a pending request and take one copy off the shelf.
    pub async fn approve(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = Self::lock_request(&mut tx, request_id).await?;
        if !request.status.can_transition(RequestStatus::Approved) {
            return Err(AppError::Conflict(format!(
                "Cannot approve a {} request",
                request.status
            )));
        }

        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(request.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if available == 0 {
            return Err(AppError::Conflict(
                "No copies of this book are available".to_string(),
            ));
        }

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(request.book_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'approved', decided_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Reject a pending request. No stock change.
    pub async fn reject(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = Self::lock_request(&mut tx, request_id).await?;
        if !request.status.can_transition(RequestStatus::Rejected) {
            return Err(AppError::Conflict(format!(
                "Cannot reject a {} request",
                request.status
            )));
        }

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'rejected', decided_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Return a borrowed book and put the copy back on the shelf.
    pub async fn return_request(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = Self::lock_request(&mut tx, request_id).await?;
        if !request.status.can_transition(RequestStatus::Returned) {
            return Err(AppError::Conflict(format!(
                "Cannot return a {} request",
                request.status
            )));
        }

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(request.book_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests SET status = 'returned', returned_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Borrow history for a user, oldest first
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let requests = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE user_id = $1 ORDER BY requested_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// All borrow requests with user and book details, oldest first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        let requests = sqlx::query_as::<_, BorrowRequestDetails>(
            r#"
            SELECT r.id, r.user_id, u.username, r.book_id, b.title, r.status, r.requested_at
            FROM borrow_requests r
            JOIN users u ON r.user_id = u.id
            JOIN books b ON r.book_id = b.id
            ORDER BY r.requested_at, r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Lock a request row for the rest of the transaction
    async fn lock_request(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        request_id: i32,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Borrow request with id {} not found", request_id))
        })
    }
}
