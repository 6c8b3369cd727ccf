//! HTTP handlers for the catalog site

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod view;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::{Form, FormRejection};
use serde::Deserialize;
use std::str::FromStr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    AppState,
};

/// The caller's identity: None for anonymous requests
pub struct CurrentUser(pub Option<UserClaims>);

impl CurrentUser {
    pub fn claims(&self) -> Option<&UserClaims> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let auth_header = auth_header
            .to_str()
            .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(CurrentUser(Some(claims)))
    }
}

/// `?page=` as sent; parsed by `PageRequest::parse` so bad values become 404
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn raw(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// A posted form, left unchecked until the handler has authorized the caller
pub type Submitted<T> = Result<Form<T>, FormRejection>;

/// Unwrap a posted form; a body that is not a valid form is a 400
pub fn submitted<T>(form: Submitted<T>) -> AppResult<T> {
    form.map(|Form(value)| value)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse a primary key from the URL. A key of the wrong shape matches no page.
pub fn path_key<K: FromStr>(raw: &str) -> AppResult<K> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No page for {}", raw)))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/catalog/") }))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/accounts/login/", get(auth::login_form).post(auth::login))
        // Home page
        .route("/catalog/", get(catalog::index))
        // Books
        .route("/catalog/books/", get(books::list_books))
        .route("/catalog/book/:id", get(books::book_detail))
        .route("/catalog/book/create/", get(books::create_book_form).post(books::create_book))
        .route("/catalog/book/:id/update/", get(books::update_book_form).post(books::update_book))
        .route("/catalog/book/:id/delete/", get(books::delete_book_confirm).post(books::delete_book))
        // Authors
        .route("/catalog/authors/", get(authors::list_authors))
        .route("/catalog/author/:id", get(authors::author_detail))
        .route("/catalog/author/create/", get(authors::create_author_form).post(authors::create_author))
        .route("/catalog/author/:id/update/", get(authors::update_author_form).post(authors::update_author))
        .route("/catalog/author/:id/delete/", get(authors::delete_author_confirm).post(authors::delete_author))
        // Loans
        .route("/catalog/mybooks/", get(loans::my_loans))
        .route("/catalog/borrowed/", get(loans::all_loans))
        .route("/catalog/book/:id/renew/", get(loans::renew_form).post(loans::renew))
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
