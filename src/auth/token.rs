use crate::error::AppError;
use crate::models::User;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime in minutes when `JWT_EXPIRATION_MINUTES` is not set.
const DEFAULT_EXPIRATION_MINUTES: i64 = 1440;

/// Represents the claims encoded within a JWT (JSON Web Token).
///
/// The subject identifies the user; username and email ride along so that
/// token validation and profile echoes need no database round trip.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issuance timestamp (seconds since epoch).
    pub iat: usize,
}

fn secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::InternalServerError("JWT_SECRET not set".into()))
}

fn expiration_minutes() -> i64 {
    std::env::var("JWT_EXPIRATION_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_EXPIRATION_MINUTES)
}

/// Issues a signed JWT for the given user.
///
/// The token carries the user's id, username and email and expires after
/// `JWT_EXPIRATION_MINUTES` (24 hours by default). Returns the encoded token
/// together with its expiry instant.
///
/// Requires the `JWT_SECRET` environment variable for signing.
pub fn generate_token(user: &User) -> Result<(String, DateTime<Utc>), AppError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(chrono::Duration::minutes(expiration_minutes()))
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret()?.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;

    Ok((token, expires_at))
}

/// Verifies a JWT string and decodes its claims.
///
/// Default validation applies: signature and expiration. A malformed,
/// tampered or expired token yields `AppError::Unauthorized`.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret()?.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
