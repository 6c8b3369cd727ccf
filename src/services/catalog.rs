//! Catalog service: home page statistics, listings, detail pages and
//! the create/update/delete workflow for authors and books.
//!
//! Listing and editing go through the generic [`paginate`], [`save`] and
//! [`remove`] helpers, so every entity gets the same page and form semantics.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        book::{Book, BookDetail, BookForm},
        book_instance::LoanStatus,
        form::{BoundForm, FieldErrors},
        genre::Genre,
        CatalogEntity, Page, PageRequest,
    },
    repository::{EditableRepository, EntityRepository, Repository},
};

/// Titles containing this fragment are counted as "special" books
pub const SPECIAL_TITLE_FRAGMENT: &str = "колоб";

/// Counts shown on the catalog home page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexStats {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_special_books: i64,
    /// Number of authors
    #[serde(rename = "num_author")]
    pub num_authors: i64,
    pub num_genres: i64,
}

/// One page of any listable entity
pub async fn paginate<R: EntityRepository>(
    repo: &R,
    request: PageRequest,
) -> AppResult<Page<R::Entity>> {
    let total = repo.count().await?;
    request.check(total)?;
    let items = repo.list(request.limit(), request.offset()).await?;
    Ok(Page::new(items, total, request))
}

/// Validate `form` and create (`key` is None) or update the row.
///
/// The inner `Err` carries field errors; nothing is written in that case.
pub async fn save<R, F>(
    repo: &R,
    key: Option<<R::Entity as CatalogEntity>::Key>,
    form: &F,
) -> AppResult<Result<<R::Entity as CatalogEntity>::Key, FieldErrors>>
where
    R: EditableRepository,
    F: BoundForm<Valid = R::Data>,
{
    let data = match form.validate() {
        Ok(data) => data,
        Err(errors) => return Ok(Err(errors)),
    };

    let errors = repo.check(&data).await?;
    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    match key {
        Some(key) => {
            repo.update(key, &data).await?;
            tracing::info!("Updated {} {}", <R::Entity as CatalogEntity>::NAME, key);
            Ok(Ok(key))
        }
        None => {
            let key = repo.insert(&data).await?;
            tracing::info!("Created {} {}", <R::Entity as CatalogEntity>::NAME, key);
            Ok(Ok(key))
        }
    }
}

/// Delete a row by key
pub async fn remove<R: EditableRepository>(
    repo: &R,
    key: <R::Entity as CatalogEntity>::Key,
) -> AppResult<()> {
    repo.delete(key).await?;
    tracing::info!("Deleted {} {}", <R::Entity as CatalogEntity>::NAME, key);
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Home page statistics
    pub async fn index_stats(&self) -> AppResult<IndexStats> {
        Ok(IndexStats {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_instances_available: self
                .repository
                .book_instances
                .count_with_status(LoanStatus::Available)
                .await?,
            num_special_books: self
                .repository
                .books
                .count_title_containing(SPECIAL_TITLE_FRAGMENT)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
        })
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn books_page(&self, request: PageRequest) -> AppResult<Page<Book>> {
        paginate(&self.repository.books, request).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Book with author, genres and copies
    pub async fn book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.repository.books.get(id).await?;
        let author = match book.author_id {
            Some(author_id) => self.repository.authors.find(author_id).await?,
            None => None,
        };

        Ok(BookDetail {
            author,
            genres: self.repository.genres.for_book(id).await?,
            instances: self.repository.book_instances.for_book(id).await?,
            book,
        })
    }

    /// Book form pre-filled from the stored row
    pub async fn book_form(&self, id: i32) -> AppResult<BookForm> {
        let book = self.repository.books.get(id).await?;
        let genre_ids = self.repository.books.genre_ids(id).await?;
        Ok(BookForm::prefilled(&book, &genre_ids))
    }

    /// Choices offered by the book form
    pub async fn book_form_choices(&self) -> AppResult<(Vec<Author>, Vec<Genre>)> {
        Ok((
            self.repository.authors.all().await?,
            self.repository.genres.all().await?,
        ))
    }

    pub async fn save_book(
        &self,
        id: Option<i32>,
        form: &BookForm,
    ) -> AppResult<Result<i32, FieldErrors>> {
        save(&self.repository.books, id, form).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        remove(&self.repository.books, id).await
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn authors_page(&self, request: PageRequest) -> AppResult<Page<Author>> {
        paginate(&self.repository.authors, request).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get(id).await
    }

    /// Author with their books
    pub async fn author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get(id).await?;
        Ok(AuthorDetail {
            books: self.repository.authors.books(id).await?,
            author,
        })
    }

    pub async fn save_author(
        &self,
        id: Option<i32>,
        form: &AuthorForm,
    ) -> AppResult<Result<i32, FieldErrors>> {
        save(&self.repository.authors, id, form).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        remove(&self.repository.authors, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::error::AppError;
    use crate::models::author::AuthorData;

    /// In-memory author table
    #[derive(Default)]
    struct FakeAuthors {
        rows: Mutex<Vec<Author>>,
    }

    impl FakeAuthors {
        fn with(n: i32) -> Self {
            let rows = (1..=n)
                .map(|id| Author {
                    id,
                    first_name: format!("First{}", id),
                    last_name: format!("Last{:02}", id),
                    date_of_birth: None,
                    date_of_death: None,
                })
                .collect();
            Self { rows: Mutex::new(rows) }
        }
    }

    #[async_trait]
    impl EntityRepository for FakeAuthors {
        type Entity = Author;

        async fn count(&self) -> AppResult<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().skip(offset as usize).take(limit as usize).cloned().collect())
        }

        async fn find(&self, id: i32) -> AppResult<Option<Author>> {
            Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
        }
    }

    #[async_trait]
    impl EditableRepository for FakeAuthors {
        type Data = AuthorData;

        async fn insert(&self, data: &AuthorData) -> AppResult<i32> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().map(|a| a.id).max().unwrap_or(0) + 1;
            rows.push(Author {
                id,
                first_name: data.first_name.clone(),
                last_name: data.last_name.clone(),
                date_of_birth: data.date_of_birth,
                date_of_death: data.date_of_death,
            });
            Ok(id)
        }

        async fn update(&self, id: i32, data: &AuthorData) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
            row.first_name = data.first_name.clone();
            row.last_name = data.last_name.clone();
            Ok(())
        }

        async fn delete(&self, id: i32) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|a| a.id != id);
            if rows.len() == before {
                return Err(AppError::NotFound(format!("Author with id {} not found", id)));
            }
            Ok(())
        }
    }

    fn author_form(first: &str, last: &str) -> AuthorForm {
        AuthorForm {
            first_name: first.into(),
            last_name: last.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pages_cover_all_rows_without_duplicates() {
        let repo = FakeAuthors::with(10);
        let mut ids = Vec::new();
        let mut number = 1;

        loop {
            let page = paginate(&repo, PageRequest::new(number, 4)).await.unwrap();
            assert!(page.object_list.len() <= 4);
            ids.extend(page.object_list.iter().map(|a| a.id));
            match page.page_obj.next_page_number {
                Some(next) => number = next,
                None => break,
            }
        }

        assert_eq!(number, 3);
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_not_found() {
        let repo = FakeAuthors::with(4);
        assert!(matches!(
            paginate(&repo, PageRequest::new(2, 4)).await,
            Err(AppError::NotFound(_))
        ));

        let empty = FakeAuthors::default();
        let page = paginate(&empty, PageRequest::new(1, 4)).await.unwrap();
        assert!(page.object_list.is_empty());
        assert!(!page.is_paginated);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = FakeAuthors::with(1);
        assert!(matches!(repo.get(99).await, Err(AppError::NotFound(_))));
        assert_eq!(repo.get(1).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let repo = FakeAuthors::default();

        let id = save(&repo, None, &author_form("Ivan", "Bunin")).await.unwrap().unwrap();
        assert_eq!(repo.get(id).await.unwrap().last_name, "Bunin");

        let same = save(&repo, Some(id), &author_form("Ivan", "Krylov")).await.unwrap().unwrap();
        assert_eq!(same, id);
        assert_eq!(repo.get(id).await.unwrap().last_name, "Krylov");
    }

    #[tokio::test]
    async fn test_invalid_form_writes_nothing() {
        let repo = FakeAuthors::with(1);

        let errors = save(&repo, Some(1), &author_form("", "Krylov")).await.unwrap().unwrap_err();
        assert!(errors.get("first_name").is_some());
        assert_eq!(repo.get(1).await.unwrap().last_name, "Last01");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = FakeAuthors::default();
        let result = save(&repo, Some(5), &author_form("Ivan", "Bunin")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = FakeAuthors::with(2);
        remove(&repo, 1).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(matches!(remove(&repo, 1).await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_index_stats_context_keys() {
        let stats = IndexStats {
            num_books: 1,
            num_instances: 2,
            num_instances_available: 3,
            num_special_books: 4,
            num_authors: 5,
            num_genres: 6,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["num_author"], 5);
        assert_eq!(json["num_special_books"], 4);
    }
}
