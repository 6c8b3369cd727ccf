//! Book instance (physical copy) model and the renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::form::{required_date, BoundForm, FieldErrors};

/// Availability of a copy, stored as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn as_char(&self) -> char {
        match self {
            LoanStatus::Maintenance => 'm',
            LoanStatus::OnLoan => 'o',
            LoanStatus::Available => 'a',
            LoanStatus::Reserved => 'r',
        }
    }

    /// Column value used in queries
    pub fn code(&self) -> String {
        self.as_char().to_string()
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status: {:?}", other)),
        }
    }
}

/// Physical copy of a book, joined with its title and borrower
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
}

impl BookInstance {
    /// Due date is set and already passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }
}

/// Loan row as listed on the loan pages
#[derive(Debug, Clone, Serialize)]
pub struct LoanEntry {
    #[serde(flatten)]
    pub instance: BookInstance,
    pub is_overdue: bool,
    pub renew_url: String,
}

impl LoanEntry {
    pub fn new(instance: BookInstance, today: NaiveDate) -> Self {
        Self {
            is_overdue: instance.is_overdue(today),
            renew_url: format!("/catalog/book/{}/renew/", instance.id),
            instance,
        }
    }
}

/// Librarian form proposing a new due date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewBookForm {
    pub renewal_date: String,
}

impl RenewBookForm {
    /// Form pre-filled with `today + weeks`
    pub fn proposed(today: NaiveDate, weeks: i64) -> Self {
        Self {
            renewal_date: (today + Duration::weeks(weeks)).to_string(),
        }
    }
}

impl BoundForm for RenewBookForm {
    type Valid = NaiveDate;

    // Any parseable date is accepted, past dates included.
    fn validate(&self) -> Result<NaiveDate, FieldErrors> {
        let mut errors = FieldErrors::new();
        match required_date("renewal_date", &self.renewal_date, &mut errors) {
            Some(date) => errors.into_result(date),
            None => Err(errors),
        }
    }
}
