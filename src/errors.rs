//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Workflow code reports
//! validation and state-machine violations with a specific variant; storage failures
//! arrive through `#[from] DbErr` and are classified as internal by [`Error::kind`].

use sea_orm::DbErr;
use thiserror::Error;

/// Caller-facing classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, missing or out-of-range input
    InvalidArgument,
    /// No credential, or a credential that does not resolve to a user
    Unauthorized,
    /// Valid credential, insufficient role or ownership
    Forbidden,
    /// Referenced entity does not exist
    NotFound,
    /// Duplicate or state-machine violation
    Conflict,
    /// Unexpected storage, gateway or configuration failure
    Internal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed validation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
    },

    /// Credential missing or unresolvable
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Reason shown to the caller
        message: String,
    },

    /// Principal lacks the role or ownership required
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason shown to the caller
        message: String,
    },

    /// A referenced row does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `"Charity"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The operation conflicts with current state
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// Unexpected failure in a collaborator
    #[error("Internal error: {message}")]
    Internal {
        /// Detail for logs; never sent to callers
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure (binding sockets, reading config)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps the error onto the caller-facing taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Internal { .. } | Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
