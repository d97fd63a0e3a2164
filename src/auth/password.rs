use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// A one-way credential hashing scheme.
///
/// Verification always goes through the digest; plaintext passwords are never
/// compared. The indirection exists so the scheme can be swapped without
/// touching the auth handlers.
pub trait CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, AppError>;
    fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError>;
}

/// The default scheme: salted bcrypt at the library's default cost.
pub struct BcryptHasher;

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError> {
        verify(password, digest)
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    BcryptHasher.hash(password)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    BcryptHasher.verify(password, hashed_password)
}
