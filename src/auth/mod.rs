pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password, BcryptHasher, CredentialHasher};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Between 3 and 50 characters, alphanumeric plus underscores or hyphens.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Between 6 and 100 characters.
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
}

/// Represents the payload for a user login request.
///
/// The canonical field is `usernameOrEmail`; the separate `username` and
/// `email` fields are accepted for older clients, first non-blank wins.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Resolves the login identifier from whichever field was supplied.
    pub fn identifier(&self) -> Option<&str> {
        [&self.username_or_email, &self.username, &self.email]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Represents the payload for a password change request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, max = 100))]
    pub new_password: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}
