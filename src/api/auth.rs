//! Login endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse},
    AppState,
};

use super::view::View;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Serialize)]
pub struct LoginContext {
    /// Where to go once logged in
    pub next: String,
}

/// Login page
#[utoipa::path(
    get,
    path = "/accounts/login/",
    tag = "auth",
    params(
        ("next" = Option<String>, Query, description = "Page to return to after login")
    ),
    responses(
        (status = 200, description = "Template registration/login.html")
    )
)]
pub async fn login_form(Query(query): Query<LoginQuery>) -> View<LoginContext> {
    View::new(
        "registration/login.html",
        LoginContext {
            next: query.next.unwrap_or_else(|| "/catalog/".to_string()),
        },
    )
}

/// Authenticate user and return a bearer token
#[utoipa::path(
    post,
    path = "/accounts/login/",
    tag = "auth",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(Json(response))
}
