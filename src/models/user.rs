//! User model, login payloads and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::permission::Permission;

/// User row from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Known permissions held by this user; unknown names are ignored
    pub fn granted(&self) -> Vec<Permission> {
        self.permissions
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect()
    }
}

/// Login form
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Lifetime of the token in seconds
    pub expires_in: i64,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub username: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> UserClaims {
        UserClaims {
            sub: "marian".to_string(),
            user_id: 3,
            username: "marian".to_string(),
            permissions: vec![Permission::CanMarkReturned],
            exp,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let exp = Utc::now().timestamp() + 3600;
        let token = claims(exp).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();

        assert_eq!(parsed.user_id, 3);
        assert!(parsed.has_permission(Permission::CanMarkReturned));
        assert!(!parsed.has_permission(Permission::BookManage));
    }

    #[test]
    fn test_token_wrong_secret() {
        let exp = Utc::now().timestamp() + 3600;
        let token = claims(exp).create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token() {
        let token = claims(Utc::now().timestamp() - 3600).create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_granted_skips_unknown() {
        let user = User {
            id: 1,
            username: "u".into(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            permissions: vec!["catalog.can_mark_returned".into(), "is_staff".into()],
            is_active: true,
            date_joined: Utc::now(),
        };
        assert_eq!(user.granted(), vec![Permission::CanMarkReturned]);
    }
}
