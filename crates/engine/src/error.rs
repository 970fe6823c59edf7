//! The module contains the errors the engine can return.
//!
//! - [`Validation`] when user supplied attributes break a model rule; it
//!   carries every failing field, not only the first one.
//! - [`KeyNotFound`] when a user or micropost does not exist.
//! - [`Forbidden`] when the acting user does not own the target.
//! - [`InvalidToken`] and [`ExpiredToken`] for password reset links.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`InvalidToken`]: EngineError::InvalidToken
//!  [`ExpiredToken`]: EngineError::ExpiredToken
use sea_orm::DbErr;
use thiserror::Error;

use crate::ValidationErrors;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Expired token: {0}")]
    ExpiredToken(String),
    #[error("Digest failure: {0}")]
    Digest(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<ValidationErrors> for EngineError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidToken(a), Self::InvalidToken(b)) => a == b,
            (Self::ExpiredToken(a), Self::ExpiredToken(b)) => a == b,
            (Self::Digest(a), Self::Digest(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
