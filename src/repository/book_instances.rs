//! Book instances repository: copies, loans and due dates

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, LoanStatus},
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.status::text AS status, bi.borrower_id, u.username AS borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Queries behind the loan pages and the renewal form
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// A copy by id, `NotFound` when missing
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>>;

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Copies of one book
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.due_back ASC NULLS LAST, bi.id",
            INSTANCE_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                .bind(status.code())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl LoanRepository for BookInstancesRepository {
    /// Get a copy by ID
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Count copies on loan, optionally only those borrowed by `borrower_id`
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE status = $1 AND ($2::int4 IS NULL OR borrower_id = $2)
            "#,
        )
        .bind(LoanStatus::OnLoan.code())
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Copies on loan ordered by due date, optionally only those borrowed by `borrower_id`
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            r#"
            {}
            WHERE bi.status = $1 AND ($2::int4 IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
            INSTANCE_SELECT
        );

        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(LoanStatus::OnLoan.code())
            .bind(borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// Set a new due-back date
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
