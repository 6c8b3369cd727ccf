//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod form;
pub mod genre;
pub mod pagination;
pub mod permission;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_instance::{BookInstance, LoanStatus};
pub use genre::Genre;
pub use pagination::{Page, PageRequest};
pub use permission::{Action, Permission, Resource};
pub use user::{User, UserClaims};

/// Identity and location of an entity served by the generic catalog views
pub trait CatalogEntity {
    type Key: Copy + std::fmt::Display + Send + Sync;

    /// Human-readable entity name used in messages
    const NAME: &'static str;
    const LIST_URL: &'static str;

    fn primary_key(&self) -> Self::Key;

    fn detail_url(key: Self::Key) -> String;

    fn url(&self) -> String {
        Self::detail_url(self.primary_key())
    }
}
