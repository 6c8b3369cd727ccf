//! Template-and-context responses

use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::models::form::FieldErrors;

/// A rendered page: the template to use and the values it receives
#[derive(Debug, Serialize)]
pub struct View<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C: Serialize> View<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for View<C> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Submitted or initial form values with their errors
#[derive(Debug, Serialize)]
pub struct FormState<F> {
    #[serde(flatten)]
    pub data: F,
    pub errors: FieldErrors,
}

impl<F: Serialize> FormState<F> {
    /// An unsubmitted form
    pub fn initial(data: F) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn invalid(data: F, errors: FieldErrors) -> Self {
        Self { data, errors }
    }
}

/// Send an anonymous caller to the login page, then back to `next`
pub fn login_redirect(next: &str) -> Redirect {
    Redirect::to(&format!("/accounts/login/?next={}", next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};

    #[derive(Serialize)]
    struct Renew {
        renewal_date: String,
    }

    #[test]
    fn test_form_state_flattens_values() {
        let mut errors = FieldErrors::new();
        errors.add("renewal_date", "Enter a valid date.");
        let state = FormState::invalid(
            Renew {
                renewal_date: "soon".to_string(),
            },
            errors,
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["renewal_date"], "soon");
        assert_eq!(json["errors"]["renewal_date"][0], "Enter a valid date.");
    }

    #[test]
    fn test_login_redirect_carries_next() {
        let response = login_redirect("/catalog/mybooks/").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[LOCATION],
            "/accounts/login/?next=/catalog/mybooks/"
        );
    }
}
