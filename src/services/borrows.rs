//! Borrow request lifecycle service

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow_request::{BorrowRequest, BorrowRequestDetails},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a pending borrow request for a book
    pub async fn request_borrow(&self, user_id: i32, book_id: i32) -> AppResult<BorrowRequest> {
        let request = self.repository.borrows.create(user_id, book_id).await?;
        tracing::info!(
            "Borrow request {} created: user {} -> book {}",
            request.id,
            user_id,
            book_id
        );
        Ok(request)
    }

    /// Approve a pending request (admin action)
    pub async fn approve(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let request = self.repository.borrows.approve(request_id).await?;
        tracing::info!("Borrow request {} approved", request_id);
        Ok(request)
    }

    /// Reject a pending request (admin action)
    pub async fn reject(&self, request_id: i32) -> AppResult<BorrowRequest> {
        let request = self.repository.borrows.reject(request_id).await?;
        tracing::info!("Borrow request {} rejected", request_id);
        Ok(request)
    }

    /// Return a borrowed book.
    ///
    /// Allowed for the request's owner or an admin.
    pub async fn return_book(
        &self,
        request_id: i32,
        caller: &UserClaims,
    ) -> AppResult<BorrowRequest> {
        let request = self.repository.borrows.get_by_id(request_id).await?;
        if !caller.is_admin() && request.user_id != caller.user_id {
            return Err(AppError::Authorization(
                "Only the requesting member or an admin may return this book".to_string(),
            ));
        }

        let request = self.repository.borrows.return_request(request_id).await?;
        tracing::info!("Borrow request {} returned", request_id);
        Ok(request)
    }

    /// Borrow history for a user
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.history(user_id).await
    }

    /// All borrow requests with details (admin listing)
    pub async fn list_requests(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.borrows.list_all().await
    }
}
