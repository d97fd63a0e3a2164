//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management so that every fault a handler can hit — database
//! issues, failed validation, bad credentials — is represented the same way and
//! rendered as a JSON body with a `message` field and the matching HTTP status.
//!
//! `AppError` implements `actix_web::error::ResponseError`, and `From` conversions
//! exist for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` so handlers can use `?`.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failure: bad credentials, missing/invalid/expired token,
    /// or wrong current password (HTTP 401).
    Unauthorized(String),
    /// A malformed or otherwise unusable request (HTTP 400).
    BadRequest(String),
    /// A uniqueness conflict, e.g. duplicate username or email (HTTP 400).
    Conflict(String),
    /// The requested resource does not exist, or is not visible to the
    /// authenticated user (HTTP 404).
    NotFound(String),
    /// An unexpected server-side fault (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation on a request body (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects with a JSON
/// `{"message": ...}` body.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "message": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "message": msg
            })),
            AppError::Conflict(msg) => HttpResponse::BadRequest().json(json!({
                "message": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "message": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "message": msg
            })),
            // Database errors are presented as generic internal server errors.
            AppError::DatabaseError(_) => HttpResponse::InternalServerError().json(json!({
                "message": "An unexpected error occurred"
            })),
            AppError::ValidationError(msg) => HttpResponse::BadRequest().json(json!({
                "message": msg
            })),
        }
    }
}

/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
