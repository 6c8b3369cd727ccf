//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookData},
        form::{FieldErrors, INVALID_CHOICE},
    },
};

use super::{EditableRepository, EntityRepository};

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.author_id,
    CASE WHEN a.id IS NULL THEN NULL ELSE a.last_name || ', ' || a.first_name END AS author_name,
    b.summary, b.isbn
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Count books whose title contains `fragment` (case-sensitive)
    pub async fn count_title_containing(&self, fragment: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE strpos(title, $1) > 0",
        )
        .bind(fragment)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn genre_ids(&self, book_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT genre_id FROM book_genres WHERE book_id = $1 ORDER BY genre_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn replace_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl EntityRepository for BooksRepository {
    type Entity = Book;

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title, b.id
            LIMIT $1 OFFSET $2
            "#,
            BOOK_COLUMNS
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn find(&self, id: i32) -> AppResult<Option<Book>> {
        let query = format!(
            "SELECT {} FROM books b LEFT JOIN authors a ON a.id = b.author_id WHERE b.id = $1",
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }
}

#[async_trait]
impl EditableRepository for BooksRepository {
    type Data = BookData;

    async fn check(&self, data: &BookData) -> AppResult<FieldErrors> {
        let mut errors = FieldErrors::new();

        let author_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(data.author_id)
                .fetch_one(&self.pool)
                .await?;
        if !author_exists {
            errors.add("author", INVALID_CHOICE);
        }

        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ANY($1)")
            .bind(&data.genre_ids)
            .fetch_all(&self.pool)
            .await?;
        for id in data.genre_ids.iter().filter(|id| !found.contains(id)) {
            errors.add("genre", format!("{} {} is not one of the available choices.", INVALID_CHOICE, id));
        }

        Ok(errors)
    }

    async fn insert(&self, data: &BookData) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_genres(&mut tx, id, &data.genre_ids).await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn update(&self, id: i32, data: &BookData) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE books SET title = $1, author_id = $2, summary = $3, isbn = $4 WHERE id = $5",
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Self::replace_genres(&mut tx, id, &data.genre_ids).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_store(e, "Book"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
