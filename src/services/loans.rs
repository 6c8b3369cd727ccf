//! Loan listings and the librarian renewal workflow

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, LoanEntry, RenewBookForm},
        form::{BoundForm, FieldErrors},
        Page, PageRequest,
    },
    repository::book_instances::LoanRepository,
};

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Outcome of a submitted renewal form
#[derive(Debug)]
pub enum Renewal {
    /// New due date stored
    Renewed(NaiveDate),
    /// Form rejected; the copy is unchanged
    Invalid(BookInstance, FieldErrors),
}

#[derive(Clone)]
pub struct LoansService {
    loans: Arc<dyn LoanRepository>,
    renewal_weeks: i64,
}

impl LoansService {
    pub fn new(loans: Arc<dyn LoanRepository>, renewal_weeks: i64) -> Self {
        Self {
            loans,
            renewal_weeks,
        }
    }

    /// Copies on loan, ordered by due date; all borrowers when `borrower_id` is None
    pub async fn loans_page(
        &self,
        borrower_id: Option<i32>,
        request: PageRequest,
    ) -> AppResult<Page<LoanEntry>> {
        let total = self.loans.count_on_loan(borrower_id).await?;
        request.check(total)?;

        let instances = self
            .loans
            .list_on_loan(borrower_id, request.limit(), request.offset())
            .await?;

        let today = today();
        Ok(Page::new(instances, total, request).map(|i| LoanEntry::new(i, today)))
    }

    /// The copy to renew and a form proposing the default due date
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<(BookInstance, RenewBookForm)> {
        let instance = self.loans.get_by_id(id).await?;
        Ok((instance, RenewBookForm::proposed(today(), self.renewal_weeks)))
    }

    /// Validate the submitted date and store it as the copy's due date
    pub async fn renew(&self, id: Uuid, form: &RenewBookForm) -> AppResult<Renewal> {
        let instance = self.loans.get_by_id(id).await?;

        match form.validate() {
            Ok(due_back) => {
                self.loans.set_due_back(id, due_back).await?;
                tracing::info!(
                    "Renewed book instance {}: due back {} (was {:?})",
                    id,
                    due_back,
                    instance.due_back
                );
                Ok(Renewal::Renewed(due_back))
            }
            Err(errors) => Ok(Renewal::Invalid(instance, errors)),
        }
    }
}
