//! Loan listings and the librarian renewal form

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, RenewBookForm},
        permission::authorize,
        Action, PageRequest, Resource,
    },
    services::loans::Renewal,
    AppState,
};

use super::{
    view::{login_redirect, FormState, View},
    path_key, submitted, CurrentUser, PageQuery, Submitted,
};

#[derive(Serialize)]
pub struct RenewContext {
    pub form: FormState<RenewBookForm>,
    pub bookinst: BookInstance,
}

fn renew_view(form: FormState<RenewBookForm>, bookinst: BookInstance) -> View<RenewContext> {
    View::new("catalog/book_renew_librarian.html", RenewContext { form, bookinst })
}

/// Copies the current user has on loan, soonest due first
#[utoipa::path(
    get,
    path = "/catalog/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Template catalog/bookinstance_list_borrowed_user.html", body = Vec<BookInstance>),
        (status = 303, description = "Anonymous; redirect to the login page"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn my_loans(
    State(state): State<AppState>,
    user: CurrentUser,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let Some(claims) = user.claims() else {
        return Ok(login_redirect(uri.path()).into_response());
    };
    authorize(Some(claims), Action::List, Resource::OwnLoans)?;

    let request = PageRequest::parse(query.raw(), state.config.catalog.loans_page_size)?;
    let page = state
        .services
        .loans
        .loans_page(Some(claims.user_id), request)
        .await?;

    Ok(View::new("catalog/bookinstance_list_borrowed_user.html", page).into_response())
}

/// Every copy on loan, with its borrower
#[utoipa::path(
    get,
    path = "/catalog/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Template catalog/bookinstance_list_borrowed_all_users.html", body = Vec<BookInstance>),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn all_loans(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::List, Resource::AllLoans)?;

    let request = PageRequest::parse(query.raw(), state.config.catalog.loans_page_size)?;
    let page = state.services.loans.loans_page(None, request).await?;

    Ok(View::new("catalog/bookinstance_list_borrowed_all_users.html", page).into_response())
}

/// Renewal form proposing the default due date
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Template catalog/book_renew_librarian.html"),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<View<RenewContext>> {
    authorize(user.claims(), Action::Renew, Resource::BookInstance)?;
    let id: Uuid = path_key(&id)?;

    let (instance, form) = state.services.loans.renewal_form(id).await?;
    Ok(renew_view(FormState::initial(form), instance))
}

/// Store a new due date
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 303, description = "Renewed; redirect to all borrowed books"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    form: Submitted<RenewBookForm>,
) -> AppResult<Response> {
    authorize(user.claims(), Action::Renew, Resource::BookInstance)?;
    let id: Uuid = path_key(&id)?;
    let form = submitted(form)?;

    match state.services.loans.renew(id, &form).await? {
        Renewal::Renewed(_) => Ok(Redirect::to("/catalog/borrowed/").into_response()),
        Renewal::Invalid(instance, errors) => {
            Ok(renew_view(FormState::invalid(form, errors), instance).into_response())
        }
    }
}
