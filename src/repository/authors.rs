//! Authors repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorData},
        book::BookShort,
    },
};

use super::{EditableRepository, EntityRepository};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Books written by an author, by title
    pub async fn books(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            "SELECT id, title, summary FROM books WHERE author_id = $1 ORDER BY title, id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Every author, for the book form's choices
    pub async fn all(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, first_name, last_name, date_of_birth, date_of_death
            FROM authors
            ORDER BY last_name, first_name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }
}

#[async_trait]
impl EntityRepository for AuthorsRepository {
    type Entity = Author;

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, first_name, last_name, date_of_birth, date_of_death
            FROM authors
            ORDER BY last_name, first_name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn find(&self, id: i32) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }
}

#[async_trait]
impl EditableRepository for AuthorsRepository {
    type Data = AuthorData;

    async fn insert(&self, data: &AuthorData) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: i32, data: &AuthorData) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
            WHERE id = $5
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_store(e, "Author"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
