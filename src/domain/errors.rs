//! Domain error types
//!
//! This module defines the error hierarchy for medrecord. Every failure a
//! caller can observe maps onto a stable [`ErrorKind`], independent of the
//! storage or transport crates underneath.

use thiserror::Error;

/// Main medrecord error type
///
/// This is the primary error type used throughout the crate. Service
/// operations only ever surface the first six variants to callers; the rest
/// describe infrastructure failures that propagate unmodified.
#[derive(Debug, Error)]
pub enum MedrecordError {
    /// The referenced document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation or audit serialization failure, or a policy-rejected request
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A downstream dependency could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The requested document is not in a disclosable state
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed identifier string
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Wire timestamp outside the representable range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Request field failed a domain rule (e.g. malformed NPI)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Stable error taxonomy exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing referenced document
    NotFound,
    /// Validation, serialization or policy failure
    NotAcceptable,
    /// Uniqueness violation
    Conflict,
    /// Downstream dependency unreachable
    ServiceUnavailable,
    /// Document not yet disclosable
    Forbidden,
    /// Infrastructure failure (store, I/O, configuration)
    Internal,
}

impl MedrecordError {
    /// Classify the error into the caller-facing taxonomy
    ///
    /// Malformed identifiers, timestamps and other request validation
    /// failures classify as `NotAcceptable`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MedrecordError::NotFound(_) => ErrorKind::NotFound,
            MedrecordError::NotAcceptable(_)
            | MedrecordError::InvalidIdentifier(_)
            | MedrecordError::InvalidTimestamp(_)
            | MedrecordError::Validation(_) => ErrorKind::NotAcceptable,
            MedrecordError::Conflict(_) => ErrorKind::Conflict,
            MedrecordError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            MedrecordError::Forbidden(_) => ErrorKind::Forbidden,
            MedrecordError::Configuration(_)
            | MedrecordError::Database(_)
            | MedrecordError::Serialization(_)
            | MedrecordError::Io(_) => ErrorKind::Internal,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for MedrecordError {
    fn from(err: std::io::Error) -> Self {
        MedrecordError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MedrecordError {
    fn from(err: serde_json::Error) -> Self {
        MedrecordError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MedrecordError {
    fn from(err: toml::de::Error) -> Self {
        MedrecordError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MedrecordError::NotFound("allergies/abc".to_string());
        assert_eq!(err.to_string(), "Not found: allergies/abc");
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            MedrecordError::NotFound(String::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            MedrecordError::InvalidIdentifier("zz".to_string()).kind(),
            ErrorKind::NotAcceptable
        );
        assert_eq!(
            MedrecordError::Conflict(String::new()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            MedrecordError::Database("down".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MedrecordError = json_err.into();
        assert!(matches!(err, MedrecordError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MedrecordError = toml_err.into();
        assert!(matches!(err, MedrecordError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MedrecordError = io_err.into();
        assert!(matches!(err, MedrecordError::Io(_)));
    }
}
