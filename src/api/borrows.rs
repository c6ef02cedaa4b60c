//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::borrow_request::{BorrowRequest, BorrowRequestDetails, CreateBorrowRequest},
};

use super::AuthenticatedUser;

/// Create a borrow request for a book
#[utoipa::path(
    post,
    path = "/borrow_request",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Request created", body = BorrowRequest),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn create_borrow_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let created = state
        .services
        .borrows
        .request_borrow(claims.user_id, request.book_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get the caller's own borrow history
#[utoipa::path(
    get,
    path = "/borrow_history",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's borrow history", body = Vec<BorrowRequest>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn borrow_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let history = state.services.borrows.history(claims.user_id).await?;
    Ok(Json(history))
}

/// List all borrow requests (admin only)
#[utoipa::path(
    get,
    path = "/borrow_requests",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrow requests", body = Vec<BorrowRequestDetails>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_borrow_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    claims.require_admin()?;

    let requests = state.services.borrows.list_requests().await?;
    Ok(Json(requests))
}

/// Approve a pending borrow request (admin only)
#[utoipa::path(
    post,
    path = "/approve_request/{request_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("request_id" = i32, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = BorrowRequest),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not pending or no copies available")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    claims.require_admin()?;

    let approved = state.services.borrows.approve(request_id).await?;
    Ok(Json(approved))
}

/// Reject a pending borrow request (admin only)
#[utoipa::path(
    post,
    path = "/reject_request/{request_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("request_id" = i32, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequest),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    claims.require_admin()?;

    let rejected = state.services.borrows.reject(request_id).await?;
    Ok(Json(rejected))
}

/// Return a borrowed book (requesting member or admin)
#[utoipa::path(
    post,
    path = "/return_request/{request_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("request_id" = i32, Path, description = "Borrow request ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRequest),
        (status = 403, description = "Not the requesting member or an admin"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not approved")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let returned = state
        .services
        .borrows
        .return_book(request_id, &claims)
        .await?;
    Ok(Json(returned))
}
