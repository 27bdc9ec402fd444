//! Unified error type for the budget ledger.
//!
//! Every fallible operation returns [`Result`]. Callers that need to branch on
//! the broad category of a failure (for example a transport layer choosing a
//! status code) use [`Error::kind`].

use thiserror::Error;

/// Broad categories that errors are surfaced as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input.
    Validation,
    /// No such owner, card, bill, or data set.
    NotFound,
    /// Name collision for a card, bill, or owner.
    DuplicateKey,
    /// Missing or unknown identity.
    Unauthorized,
    /// Anything unexpected (storage, configuration, I/O).
    Internal,
}

impl ErrorKind {
    /// Whether the caller has to re-authenticate before retrying.
    #[must_use]
    pub const fn requires_reauthentication(self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// All errors produced by the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// A field failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A monetary amount was negative, zero where not allowed, or not finite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A payment could not be applied.
    #[error("Invalid payment: {message}")]
    InvalidPayment {
        /// Why the payment was rejected
        message: String,
    },

    /// The named entity does not exist for this owner.
    #[error("{entity} '{name}' not found")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// Key it was looked up by
        name: String,
    },

    /// An entity with this key already exists for this owner.
    #[error("{entity} '{name}' already exists")]
    DuplicateKey {
        /// Kind of entity that collided
        entity: &'static str,
        /// The colliding key
        name: String,
    },

    /// Identity was missing or not registered.
    #[error("Unauthorized: re-authentication required")]
    Unauthorized,

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Storage layer failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps this error onto its surfaced category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } | Self::InvalidPayment { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            name: name.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::InvalidAmount { amount: -1.0 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::InvalidPayment {
                message: "x".to_string()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::not_found("Bill", "rent").kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::duplicate("Credit card", "Acme").kind(),
            ErrorKind::DuplicateKey
        );
        assert_eq!(Error::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            Error::Config {
                message: "x".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_only_unauthorized_requires_reauthentication() {
        assert!(ErrorKind::Unauthorized.requires_reauthentication());
        assert!(!ErrorKind::NotFound.requires_reauthentication());
        assert!(!ErrorKind::Internal.requires_reauthentication());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::not_found("Bill", "rent").to_string(),
            "Bill 'rent' not found"
        );
        assert_eq!(
            Error::duplicate("Credit card", "Acme").to_string(),
            "Credit card 'Acme' already exists"
        );
    }
}
