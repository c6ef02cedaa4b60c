//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{borrow_request::BorrowRequest, user::{CreateUser, User}},
};

use super::AuthenticatedUser;

/// Create a new user (admin only)
#[utoipa::path(
    post,
    path = "/create_user",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;

    let created = state.services.auth.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get any user's borrow history (admin only)
#[utoipa::path(
    get,
    path = "/user/{user_id}/borrow_history",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's borrow history", body = Vec<BorrowRequest>),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_borrow_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    claims.require_admin()?;

    let history = state.services.borrows.history(user_id).await?;
    Ok(Json(history))
}
