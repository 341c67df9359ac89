//! Billing error types
//!
//! Quote computation itself never fails: malformed inputs are coerced and a
//! custom quote is a regular [`crate::BillingQuote`] variant. These errors
//! cover the edges around it: configuration, the plan catalog and the
//! registration collaborator.

use thiserror::Error;

/// Billing-specific errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid plan catalog: {0}")]
    Catalog(String),

    #[error("No plan available: {0}")]
    PlanNotFound(String),

    #[error("Registration rejected with status {status}: {message}")]
    Registration { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BillingError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BillingError::Http(_) => true,
            BillingError::Registration { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        BillingError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for BillingError {
    fn from(err: serde_json::Error) -> Self {
        BillingError::Serialization(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BillingError::Http("timeout".into()).is_transient());
        assert!(BillingError::Registration {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(BillingError::Registration {
            status: 429,
            message: "slow down".into()
        }
        .is_transient());
        assert!(!BillingError::Registration {
            status: 422,
            message: "invalid".into()
        }
        .is_transient());
        assert!(!BillingError::Catalog("bad".into()).is_transient());
    }
}
