//! Error types for the Caravan operator core

use thiserror::Error;

/// Main error type for Caravan operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Validation error for CRD specs
    #[error("validation error: {0}")]
    Validation(String),

    /// Pipeline or trait configuration fault
    ///
    /// These are programming/ordering errors, not transient conditions, and
    /// are never retried by the core.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Build execution error surfaced outside a delivered result
    #[error("build error: {0}")]
    Build(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error with the given message
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a build error with the given message
    pub fn build(msg: impl Into<String>) -> Self {
        Self::Build(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        match Error::validation("bad spec") {
            Error::Validation(msg) => assert_eq!(msg, "bad spec"),
            _ => panic!("expected Validation variant"),
        }
        match Error::configuration("no integration container") {
            Error::Configuration(msg) => assert_eq!(msg, "no integration container"),
            _ => panic!("expected Configuration variant"),
        }
        match Error::build("image push failed") {
            Error::Build(msg) => assert_eq!(msg, "image push failed"),
            _ => panic!("expected Build variant"),
        }
    }

    #[test]
    fn test_display_includes_category() {
        let err = Error::validation("integration has no sources");
        assert!(err.to_string().contains("validation error"));

        let err = Error::configuration("cannot add http container port");
        assert!(err.to_string().contains("configuration error"));
    }

    /// Configuration errors are the non-retried category: they signal a fault
    /// in how the pipeline was assembled, so controllers must not back off and
    /// try again.
    #[test]
    fn test_error_categorization_for_retry_policy() {
        fn retriable(err: &Error) -> bool {
            match err {
                Error::Kube(_) => true,
                Error::Build(_) => true,
                Error::Validation(_) | Error::Configuration(_) | Error::Serialization(_) => false,
            }
        }

        assert!(!retriable(&Error::configuration("ordering fault")));
        assert!(!retriable(&Error::validation("bad config")));
        assert!(retriable(&Error::build("transient registry failure")));
    }
}
