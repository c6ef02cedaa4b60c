//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Owlery API",
        version = "1.0.0",
        description = "Library Borrowing System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::create_admin,
        auth::me,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Users
        users::create_user,
        users::user_borrow_history,
        // Borrows
        borrows::create_borrow_request,
        borrows::borrow_history,
        borrows::list_borrow_requests,
        borrows::approve_request,
        borrows::reject_request,
        borrows::return_request,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::user::CreateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Borrows
            crate::models::borrow_request::BorrowRequest,
            crate::models::borrow_request::BorrowRequestDetails,
            crate::models::borrow_request::CreateBorrowRequest,
            crate::models::borrow_request::RequestStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "users", description = "User management"),
        (name = "borrows", description = "Borrow request lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
