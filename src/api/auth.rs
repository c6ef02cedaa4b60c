//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{RegisterRequest, Role, User},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Caller identity derived from the token
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

/// Authenticate and obtain a bearer token
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, _user) = state
        .services
        .auth
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Register a new member account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Create the first admin account
#[utoipa::path(
    post,
    path = "/create_admin",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "An admin already exists")
    )
)]
pub async fn create_admin(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.services.auth.create_admin(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get the authenticated caller's identity
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.auth.get_by_id(claims.user_id).await?;

    Ok(Json(UserInfo {
        id: user.id,
        username: user.username,
        role: user.role,
    }))
}
