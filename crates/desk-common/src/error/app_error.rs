//! Application error types
//!
//! Errors that end the process or a gateway session. Per-event failures stay
//! inside the service layer and are only logged.

use desk_core::DomainError;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway closed the session ({code}): {reason}")]
    GatewayClosed { code: u16, reason: String },

    #[error("Gateway refused the session ({code}): {reason}")]
    FatalClose { code: u16, reason: String },

    // REST client errors
    #[error("HTTP client error: {0}")]
    Http(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::GatewayClosed { .. } => "GATEWAY_CLOSED",
            Self::FatalClose { .. } => "GATEWAY_FATAL_CLOSE",
            Self::Http(_) => "HTTP_CLIENT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Whether the gateway loop may reconnect after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Gateway(_) | Self::GatewayClosed { .. })
    }

    /// Create a gateway error
    #[must_use]
    pub fn gateway(msg: impl std::fmt::Display) -> Self {
        Self::Gateway(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
