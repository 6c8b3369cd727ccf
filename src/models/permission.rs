//! Named permissions and the authorization predicate used by every handler

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

use super::user::UserClaims;

/// A named capability a user account may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "can_mark_returned")]
    CanMarkReturned,
    #[serde(rename = "authormanage")]
    AuthorManage,
    #[serde(rename = "bookmanage")]
    BookManage,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::AuthorManage => "authormanage",
            Permission::BookManage => "bookmanage",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the app-qualified spelling too (catalog.can_mark_returned)
        match s.rsplit('.').next().unwrap_or(s) {
            "can_mark_returned" => Ok(Permission::CanMarkReturned),
            "authormanage" => Ok(Permission::AuthorManage),
            "bookmanage" => Ok(Permission::BookManage),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    List,
    Create,
    Update,
    Delete,
    Renew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Book,
    Author,
    Genre,
    BookInstance,
    /// Loans of the requesting user
    OwnLoans,
    /// Loans of every user
    AllLoans,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Book => "book",
            Resource::Author => "author",
            Resource::Genre => "genre",
            Resource::BookInstance => "book instance",
            Resource::OwnLoans => "own loans",
            Resource::AllLoans => "all loans",
        };
        f.write_str(name)
    }
}

fn holds(user: Option<&UserClaims>, permission: Permission) -> bool {
    user.map(|u| u.has_permission(permission)).unwrap_or(false)
}

/// Whether `user` (None for anonymous) may perform `action` on `resource`
pub fn can(user: Option<&UserClaims>, action: Action, resource: Resource) -> bool {
    use Action::*;
    use Resource::*;

    match (action, resource) {
        (View | List, Book | Author | Genre) => true,
        (List, OwnLoans) => user.is_some(),
        (List, AllLoans) | (Renew, BookInstance) => holds(user, Permission::CanMarkReturned),
        (Create | Update | Delete, Author) => holds(user, Permission::AuthorManage),
        (Create | Update | Delete, Book) => holds(user, Permission::BookManage),
        _ => false,
    }
}

/// `can` as a guard: a denied check is a 403
pub fn authorize(user: Option<&UserClaims>, action: Action, resource: Resource) -> Result<(), AppError> {
    if can(user, action, resource) {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "Not allowed to {:?} {}",
            action, resource
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(permissions: Vec<Permission>) -> UserClaims {
        UserClaims {
            sub: "reader".to_string(),
            user_id: 7,
            username: "reader".to_string(),
            permissions,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_public_catalog() {
        for resource in [Resource::Book, Resource::Author, Resource::Genre] {
            assert!(can(None, Action::List, resource));
            assert!(can(None, Action::View, resource));
        }
    }

    #[test]
    fn test_own_loans_need_login() {
        assert!(!can(None, Action::List, Resource::OwnLoans));
        assert!(can(Some(&user(vec![])), Action::List, Resource::OwnLoans));
    }

    #[test]
    fn test_librarian_permission() {
        let reader = user(vec![]);
        let librarian = user(vec![Permission::CanMarkReturned]);

        for (action, resource) in [
            (Action::List, Resource::AllLoans),
            (Action::Renew, Resource::BookInstance),
        ] {
            assert!(!can(None, action, resource));
            assert!(!can(Some(&reader), action, resource));
            assert!(can(Some(&librarian), action, resource));
        }
    }

    #[test]
    fn test_management_permissions_are_per_entity() {
        let authors = user(vec![Permission::AuthorManage]);
        let books = user(vec![Permission::BookManage]);

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(can(Some(&authors), action, Resource::Author));
            assert!(!can(Some(&authors), action, Resource::Book));
            assert!(can(Some(&books), action, Resource::Book));
            assert!(!can(Some(&books), action, Resource::Author));
        }
    }

    #[test]
    fn test_unlisted_combinations_denied() {
        let everything = user(vec![
            Permission::CanMarkReturned,
            Permission::AuthorManage,
            Permission::BookManage,
        ]);
        assert!(!can(Some(&everything), Action::Delete, Resource::Genre));
        assert!(!can(Some(&everything), Action::Renew, Resource::Book));
    }

    #[test]
    fn test_authorize_is_forbidden() {
        let err = authorize(None, Action::Renew, Resource::BookInstance).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_permission_parsing() {
        assert_eq!("catalog.can_mark_returned".parse(), Ok(Permission::CanMarkReturned));
        assert_eq!("bookmanage".parse(), Ok(Permission::BookManage));
        assert!("superuser".parse::<Permission>().is_err());
    }
}
