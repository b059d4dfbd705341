//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use desk_common::AppError;
use desk_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or failed platform call
    Domain(DomainError),

    /// No READY has been seen yet, so the bot's own identity is unknown
    NotReady,

    /// Validation error
    Validation(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotReady => write!(f, "Session not ready: bot identity unknown"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotReady => "NOT_READY",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Check if a lookup failed
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    /// Check if a platform call failed
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_remote())
    }

    /// Check if the guild's setup, not the bot, is at fault
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_configuration())
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            other => AppError::Internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
