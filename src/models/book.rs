//! Book model and form

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    author::Author,
    book_instance::BookInstance,
    form::{required_choice, BoundForm, FieldErrors, INVALID_CHOICE, REQUIRED},
    genre::Genre,
    CatalogEntity,
};

/// Book row joined with its author's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, when there is one
    pub author_name: Option<String>,
    pub summary: String,
    pub isbn: String,
}

impl CatalogEntity for Book {
    type Key = i32;
    const NAME: &'static str = "Book";
    const LIST_URL: &'static str = "/catalog/books/";

    fn primary_key(&self) -> i32 {
        self.id
    }

    fn detail_url(key: i32) -> String {
        format!("/catalog/book/{}", key)
    }
}

/// Short book representation for author pages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub summary: String,
}

/// Book with its author, genres and copies
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// Submitted book form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Ensure this value has 1 to 200 characters."))]
    pub title: String,
    /// Author primary key
    pub author: String,
    #[validate(length(min = 1, max = 1000, message = "Ensure this value has 1 to 1000 characters."))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "Ensure this value has 1 to 13 characters."))]
    pub isbn: String,
    /// Genre primary keys; the field repeats once per selected genre
    pub genre: Vec<String>,
}

impl BookForm {
    pub fn prefilled(book: &Book, genre_ids: &[i32]) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.map(|id| id.to_string()).unwrap_or_default(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: genre_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Copy with surrounding whitespace removed from the text fields
    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            summary: self.summary.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            genre: self.genre.clone(),
        }
    }
}

/// Validated book data ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl BoundForm for BookForm {
    type Valid = BookData;

    fn validate(&self) -> Result<BookData, FieldErrors> {
        let form = self.trimmed();
        let mut errors = match Validate::validate(&form) {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let author_id = required_choice("author", &form.author, &mut errors);

        let mut genre_ids = Vec::with_capacity(form.genre.len());
        for raw in &form.genre {
            match raw.trim().parse::<i32>() {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("genre", INVALID_CHOICE),
            }
        }
        if form.genre.is_empty() {
            errors.add("genre", REQUIRED);
        }

        match author_id {
            Some(author_id) => errors.into_result(BookData {
                title: form.title,
                author_id,
                summary: form.summary,
                isbn: form.isbn,
                genre_ids,
            }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> BookForm {
        BookForm {
            title: "Колобок".into(),
            author: "1".into(),
            summary: "A runaway bun.".into(),
            isbn: "9785170000000".into(),
            genre: vec!["2".into(), "3".into()],
        }
    }

    #[test]
    fn test_valid_form() {
        let data = BoundForm::validate(&form()).unwrap();
        assert_eq!(data.author_id, 1);
        assert_eq!(data.genre_ids, vec![2, 3]);
    }

    #[test]
    fn test_blank_text_is_required() {
        let f = BookForm {
            title: "   ".into(),
            summary: "\t\n".into(),
            ..form()
        };
        let errors = BoundForm::validate(&f).unwrap_err();
        assert!(errors.get("title").is_some());
        assert!(errors.get("summary").is_some());
        assert!(errors.get("isbn").is_none());
    }

    #[test]
    fn test_text_is_stored_trimmed() {
        let f = BookForm {
            title: "  Колобок ".into(),
            ..form()
        };
        assert_eq!(BoundForm::validate(&f).unwrap().title, "Колобок");
    }

    #[test]
    fn test_duplicate_genres_collapse() {
        let f = BookForm {
            genre: vec!["2".into(), "2".into()],
            ..form()
        };
        assert_eq!(BoundForm::validate(&f).unwrap().genre_ids, vec![2]);
    }

    #[test]
    fn test_isbn_too_long() {
        let f = BookForm {
            isbn: "97851700000001".into(),
            ..form()
        };
        assert!(BoundForm::validate(&f).unwrap_err().get("isbn").is_some());
    }

    #[test]
    fn test_missing_author_and_genre() {
        let f = BookForm {
            author: String::new(),
            genre: vec![],
            ..form()
        };
        let errors = BoundForm::validate(&f).unwrap_err();
        assert_eq!(errors.get("author"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("genre"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_non_numeric_choices() {
        let f = BookForm {
            author: "tolstoy".into(),
            genre: vec!["poetry".into()],
            ..form()
        };
        let errors = BoundForm::validate(&f).unwrap_err();
        assert!(errors.get("author").is_some());
        assert!(errors.get("genre").is_some());
    }

    #[test]
    fn test_prefilled() {
        let book = Book {
            id: 9,
            title: "T".into(),
            author_id: None,
            author_name: None,
            summary: "S".into(),
            isbn: "1".into(),
        };
        let f = BookForm::prefilled(&book, &[5]);
        assert_eq!(f.author, "");
        assert_eq!(f.genre, vec!["5".to_string()]);
        assert_eq!(book.url(), "/catalog/book/9");
    }
}
