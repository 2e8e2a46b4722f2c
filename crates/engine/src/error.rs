//! The module contains the errors the engine can return.
//!
//! Callers must be able to tell apart the situations that drive different
//! user actions:
//!
//! - [`KeyNotFound`] the referenced debt or request does not exist.
//! - [`InvalidState`] the debt/request is not in the state the action needs
//!   (already settled, already resolved, ...).
//! - [`Unauthorized`] the acting user is not the designated counter-party.
//! - [`Conflict`] a pending request of the same kind already exists.
//! - [`InvalidInput`] / [`InvalidAmount`] the caller supplied bad values.
//! - [`Unavailable`] storage timed out or the connection failed.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Conflict`]: EngineError::Conflict
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Unavailable`]: EngineError::Unavailable
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Returns `true` for failures that may succeed when retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return Self::Conflict(msg);
        }
        match err {
            DbErr::ConnectionAcquire(inner) => Self::Unavailable(inner.to_string()),
            DbErr::Conn(inner) => Self::Unavailable(inner.to_string()),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
