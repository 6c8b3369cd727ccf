//! Repository layer for database operations

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{form::FieldErrors, CatalogEntity},
};

/// Read access shared by every listable catalog entity
#[async_trait]
pub trait EntityRepository: Send + Sync {
    type Entity: CatalogEntity + Send;

    async fn count(&self) -> AppResult<i64>;

    /// A slice of rows in the entity's default order
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Self::Entity>>;

    async fn find(
        &self,
        key: <Self::Entity as CatalogEntity>::Key,
    ) -> AppResult<Option<Self::Entity>>;

    /// Like `find`, but a missing row is `NotFound`
    async fn get(&self, key: <Self::Entity as CatalogEntity>::Key) -> AppResult<Self::Entity> {
        self.find(key).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "{} with id {} not found",
                <Self::Entity as CatalogEntity>::NAME,
                key
            ))
        })
    }
}

/// Write access for entities managed through forms
#[async_trait]
pub trait EditableRepository: EntityRepository {
    /// Validated form data
    type Data: Send + Sync;

    /// Checks that need the store, such as referenced rows existing
    async fn check(&self, _data: &Self::Data) -> AppResult<FieldErrors> {
        Ok(FieldErrors::new())
    }

    async fn insert(&self, data: &Self::Data) -> AppResult<<Self::Entity as CatalogEntity>::Key>;

    async fn update(
        &self,
        key: <Self::Entity as CatalogEntity>::Key,
        data: &Self::Data,
    ) -> AppResult<()>;

    async fn delete(&self, key: <Self::Entity as CatalogEntity>::Key) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub authors: authors::AuthorsRepository,
    pub genres: genres::GenresRepository,
    pub book_instances: book_instances::BookInstancesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            book_instances: book_instances::BookInstancesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
