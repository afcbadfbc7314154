//! Error types and result aliases for the jgtcore library.
//!
//! This module defines the core error type [`JgtError`] and the [`Result`] type alias
//! used throughout the library. Errors fall into two disjoint classes: validation
//! errors, which are raised loudly at call sites that received bad programmer input,
//! and operational errors (configuration, I/O, sink), which the fail-safe layers
//! catch and degrade to no-ops.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JgtError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("trace sink error: {0}")]
    SinkError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JgtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = JgtError::Validation("package_name must be a non-empty string".to_string());
        assert_eq!(
            err.to_string(),
            "invalid argument: package_name must be a non-empty string"
        );
    }

    #[test]
    fn test_config_not_found_display() {
        let err = JgtError::ConfigNotFound(PathBuf::from("/tmp/missing.json"));
        assert_eq!(
            err.to_string(),
            "configuration file not found: /tmp/missing.json"
        );
    }

    #[test]
    fn test_config_parse_display() {
        let err = JgtError::ConfigParse("expected object at top level".to_string());
        assert_eq!(
            err.to_string(),
            "configuration parse error: expected object at top level"
        );
    }

    #[test]
    fn test_sink_error_display() {
        let err = JgtError::SinkError("ingestion rejected".to_string());
        assert_eq!(err.to_string(), "trace sink error: ingestion rejected");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: JgtError = json_err.into();

        match err {
            JgtError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: JgtError = io_err.into();

        match err {
            JgtError::IoError(_) => {}
            _ => panic!("Expected IoError"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = JgtError::Validation("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Validation"));
    }
}
