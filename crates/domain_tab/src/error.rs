//! Tab domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the tab domain
///
/// Every operation detects its failure before committing any mutation for
/// that call; a returned error means the tab was left as found.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab, line, or product does not exist or is outside the caller's scope
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation attempted against a tab in a state that forbids it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input contract violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource already settled or closed in an incompatible way
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Opaque infrastructure failure from the backing store
    #[error("Store error: {0}")]
    Store(#[source] PortError),
}

impl TabError {
    pub fn not_found(message: impl Into<String>) -> Self {
        TabError::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        TabError::InvalidState(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TabError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TabError::Conflict(message.into())
    }

    /// Returns true if this error indicates a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, TabError::NotFound(_))
    }

    /// Returns true if this error indicates an input contract violation
    pub fn is_validation(&self) -> bool {
        matches!(self, TabError::Validation(_))
    }
}

impl From<PortError> for TabError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                TabError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Validation { message, .. } => TabError::Validation(message),
            PortError::Conflict { message } => TabError::Conflict(message),
            PortError::InvalidState { message } => TabError::InvalidState(message),
            other => TabError::Store(other),
        }
    }
}

impl From<MoneyError> for TabError {
    fn from(err: MoneyError) -> Self {
        TabError::Validation(err.to_string())
    }
}
