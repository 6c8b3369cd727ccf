//! Author pages: listing, detail and management forms

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        permission::authorize,
        Action, CatalogEntity, Page, PageRequest, Resource,
    },
    AppState,
};

use super::{
    view::{FormState, View},
    path_key, submitted, CurrentUser, PageQuery, Submitted,
};

#[derive(Serialize)]
pub struct AuthorFormContext {
    pub form: FormState<AuthorForm>,
    /// Author being edited; None on create
    pub author: Option<Author>,
}

#[derive(Serialize)]
pub struct AuthorDeleteContext {
    pub author: Author,
}

fn form_view(form: FormState<AuthorForm>, author: Option<Author>) -> View<AuthorFormContext> {
    View::new("catalog/author_form.html", AuthorFormContext { form, author })
}

/// Paginated author list
#[utoipa::path(
    get,
    path = "/catalog/authors/",
    tag = "authors",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Template catalog/author_list.html", body = Vec<Author>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<View<Page<Author>>> {
    authorize(user.claims(), Action::List, Resource::Author)?;

    let request = PageRequest::parse(query.raw(), state.config.catalog.page_size)?;
    let page = state.services.catalog.authors_page(request).await?;
    Ok(View::new("catalog/author_list.html", page))
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Template catalog/author_detail.html", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<AuthorDetail>> {
    authorize(user.claims(), Action::View, Resource::Author)?;
    let id: i32 = path_key(&id)?;

    let author = state.services.catalog.author_detail(id).await?;
    Ok(View::new("catalog/author_detail.html", author))
}

/// Blank author form
#[utoipa::path(
    get,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Template catalog/author_form.html"),
        (status = 403, description = "Missing authormanage permission")
    )
)]
pub async fn create_author_form(user: CurrentUser) -> AppResult<View<AuthorFormContext>> {
    authorize(user.claims(), Action::Create, Resource::Author)?;

    Ok(form_view(FormState::initial(AuthorForm::default()), None))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 303, description = "Created; redirect to the author page"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 403, description = "Missing authormanage permission")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    user: CurrentUser,
    form: Submitted<AuthorForm>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::Create, Resource::Author)?;
    let form = submitted(form)?;

    match state.services.catalog.save_author(None, &form).await? {
        Ok(id) => Ok(Redirect::to(&Author::detail_url(id)).into_response()),
        Err(errors) => Ok(form_view(FormState::invalid(form, errors), None).into_response()),
    }
}

/// Author form pre-filled from the stored author
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Template catalog/author_form.html"),
        (status = 403, description = "Missing authormanage permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<AuthorFormContext>> {
    authorize(user.claims(), Action::Update, Resource::Author)?;
    let id: i32 = path_key(&id)?;

    let author = state.services.catalog.get_author(id).await?;
    let form = AuthorForm::from(&author);
    Ok(form_view(FormState::initial(form), Some(author)))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Updated; redirect to the author page"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 403, description = "Missing authormanage permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    form: Submitted<AuthorForm>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::Update, Resource::Author)?;
    let id: i32 = path_key(&id)?;
    let form = submitted(form)?;

    let author = state.services.catalog.get_author(id).await?;
    match state.services.catalog.save_author(Some(id), &form).await? {
        Ok(id) => Ok(Redirect::to(&Author::detail_url(id)).into_response()),
        Err(errors) => Ok(form_view(FormState::invalid(form, errors), Some(author)).into_response()),
    }
}

/// Delete confirmation page
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Template catalog/author_confirm_delete.html"),
        (status = 403, description = "Missing authormanage permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_confirm(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<AuthorDeleteContext>> {
    authorize(user.claims(), Action::Delete, Resource::Author)?;
    let id: i32 = path_key(&id)?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(View::new(
        "catalog/author_confirm_delete.html",
        AuthorDeleteContext { author },
    ))
}

/// Delete an author; their books keep existing without one
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirect to the author list"),
        (status = 403, description = "Missing authormanage permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    authorize(user.claims(), Action::Delete, Resource::Author)?;
    let id: i32 = path_key(&id)?;

    state.services.catalog.delete_author(id).await?;
    Ok(Redirect::to(Author::LIST_URL))
}
