//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Catalog, loan listing and renewal pages rendered as template + context JSON",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login_form,
        auth::login,
        // Home
        catalog::index,
        // Books
        books::list_books,
        books::book_detail,
        books::create_book_form,
        books::create_book,
        books::update_book_form,
        books::update_book,
        books::delete_book_confirm,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::author_detail,
        authors::create_author_form,
        authors::create_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author_confirm,
        authors::delete_author,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::renew_form,
        loans::renew,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            // Catalog
            crate::services::catalog::IndexStats,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::author::Author,
            crate::models::genre::Genre,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::LoanStatus,
            crate::models::permission::Permission,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog home page"),
        (name = "books", description = "Book pages and management"),
        (name = "authors", description = "Author pages and management"),
        (name = "loans", description = "Loan listings and renewal")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
