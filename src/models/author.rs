//! Author model and form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    book::BookShort,
    form::{optional_date, BoundForm, FieldErrors},
    CatalogEntity,
};

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl CatalogEntity for Author {
    type Key = i32;
    const NAME: &'static str = "Author";
    const LIST_URL: &'static str = "/catalog/authors/";

    fn primary_key(&self) -> i32 {
        self.id
    }

    fn detail_url(key: i32) -> String {
        format!("/catalog/author/{}", key)
    }
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Submitted author form; raw strings so it can be re-rendered as typed
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "Ensure this value has 1 to 100 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Ensure this value has 1 to 100 characters."))]
    pub last_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
            date_of_death: author.date_of_death.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

/// Validated author data ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorData {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl BoundForm for AuthorForm {
    type Valid = AuthorData;

    fn validate(&self) -> Result<AuthorData, FieldErrors> {
        // Lengths are checked on the values that get stored
        let form = AuthorForm {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self.clone()
        };
        let mut errors = match Validate::validate(&form) {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let date_of_birth = optional_date("date_of_birth", &form.date_of_birth, &mut errors);
        let date_of_death = optional_date("date_of_death", &form.date_of_death, &mut errors);

        errors.into_result(AuthorData {
            first_name: form.first_name,
            last_name: form.last_name,
            date_of_birth,
            date_of_death,
        })
    }
}
