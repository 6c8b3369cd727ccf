//! Book pages: listing, detail and management forms

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::{Book, BookDetail, BookForm},
        form::FieldErrors,
        genre::Genre,
        permission::authorize,
        Action, CatalogEntity, Page, PageRequest, Resource,
    },
    AppState,
};

use super::{
    view::{FormState, View},
    path_key, submitted, CurrentUser, PageQuery, Submitted,
};

/// Book form with the choices it offers
#[derive(Serialize)]
pub struct BookFormContext {
    pub form: FormState<BookForm>,
    /// Book being edited; None on create
    pub book: Option<Book>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

#[derive(Serialize)]
pub struct BookDeleteContext {
    pub book: Book,
}

async fn form_view(
    state: &AppState,
    form: FormState<BookForm>,
    book: Option<Book>,
) -> AppResult<View<BookFormContext>> {
    let (authors, genres) = state.services.catalog.book_form_choices().await?;
    Ok(View::new(
        "catalog/book_form.html",
        BookFormContext {
            form,
            book,
            authors,
            genres,
        },
    ))
}

/// Redirect to the saved book, or re-render the form with its errors
async fn saved_or_invalid(
    state: &AppState,
    outcome: Result<i32, FieldErrors>,
    form: BookForm,
    book: Option<Book>,
) -> AppResult<Response> {
    match outcome {
        Ok(id) => Ok(Redirect::to(&Book::detail_url(id)).into_response()),
        Err(errors) => Ok(form_view(state, FormState::invalid(form, errors), book)
            .await?
            .into_response()),
    }
}

/// Paginated book list
#[utoipa::path(
    get,
    path = "/catalog/books/",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Template catalog/book_list.html", body = Vec<Book>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<View<Page<Book>>> {
    authorize(user.claims(), Action::List, Resource::Book)?;

    let request = PageRequest::parse(query.raw(), state.config.catalog.page_size)?;
    let page = state.services.catalog.books_page(request).await?;
    Ok(View::new("catalog/book_list.html", page))
}

/// Book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Template catalog/book_detail.html", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<BookDetail>> {
    authorize(user.claims(), Action::View, Resource::Book)?;
    let id: i32 = path_key(&id)?;

    let book = state.services.catalog.book_detail(id).await?;
    Ok(View::new("catalog/book_detail.html", book))
}

/// Blank book form
#[utoipa::path(
    get,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Template catalog/book_form.html"),
        (status = 403, description = "Missing bookmanage permission")
    )
)]
pub async fn create_book_form(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<View<BookFormContext>> {
    authorize(user.claims(), Action::Create, Resource::Book)?;

    form_view(&state, FormState::initial(BookForm::default()), None).await
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 303, description = "Created; redirect to the book page"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 403, description = "Missing bookmanage permission")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: CurrentUser,
    form: Submitted<BookForm>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::Create, Resource::Book)?;
    let form = submitted(form)?;

    let outcome = state.services.catalog.save_book(None, &form).await?;
    saved_or_invalid(&state, outcome, form, None).await
}

/// Book form pre-filled from the stored book
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Template catalog/book_form.html"),
        (status = 403, description = "Missing bookmanage permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<BookFormContext>> {
    authorize(user.claims(), Action::Update, Resource::Book)?;
    let id: i32 = path_key(&id)?;

    let book = state.services.catalog.get_book(id).await?;
    let form = state.services.catalog.book_form(id).await?;
    form_view(&state, FormState::initial(form), Some(book)).await
}

/// Update a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Updated; redirect to the book page"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 403, description = "Missing bookmanage permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    form: Submitted<BookForm>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::Update, Resource::Book)?;
    let id: i32 = path_key(&id)?;
    let form = submitted(form)?;

    let book = state.services.catalog.get_book(id).await?;
    let outcome = state.services.catalog.save_book(Some(id), &form).await?;
    saved_or_invalid(&state, outcome, form, Some(book)).await
}

/// Delete confirmation page
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Template catalog/book_confirm_delete.html"),
        (status = 403, description = "Missing bookmanage permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_confirm(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<BookDeleteContext>> {
    authorize(user.claims(), Action::Delete, Resource::Book)?;
    let id: i32 = path_key(&id)?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(View::new("catalog/book_confirm_delete.html", BookDeleteContext { book }))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirect to the book list"),
        (status = 403, description = "Missing bookmanage permission"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    authorize(user.claims(), Action::Delete, Resource::Book)?;
    let id: i32 = path_key(&id)?;

    state.services.catalog.delete_book(id).await?;
    Ok(Redirect::to(Book::LIST_URL))
}
