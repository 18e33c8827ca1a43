//! Common error types used across all Viz House crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which part of a series configuration a column was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    XAxis,
    YAxis,
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::XAxis => write!(f, "x axis"),
            ColumnRole::YAxis => write!(f, "y axis"),
            ColumnRole::Value => write!(f, "value"),
        }
    }
}

/// Base error type for all Viz House operations
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ChartsError {
    // Data-related errors
    #[error("Failed to parse JSON: {message}")]
    Decode {
        message: String,
        line: Option<usize>,
    },

    #[error(
        "The provided {role} column {column} isn't a part of this query's results ({series})"
    )]
    MissingColumn {
        role: ColumnRole,
        column: String,
        series: String,
    },

    // Network errors
    #[error("Network request failed: {message}")]
    Network { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Response has no body")]
    MissingBody,

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for Viz House operations
pub type ChartsResult<T> = Result<T, ChartsError>;

impl ChartsError {
    /// Decode error for a specific line of an NDJSON stream
    pub fn decode_at(line: usize, message: impl Into<String>) -> Self {
        ChartsError::Decode {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        ChartsError::InvalidConfig {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Whether the next scheduled attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChartsError::Network { .. } | ChartsError::Http { .. } | ChartsError::MissingBody
        )
    }
}

impl From<serde_json::Error> for ChartsError {
    fn from(err: serde_json::Error) -> Self {
        ChartsError::Decode {
            message: err.to_string(),
            line: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = ChartsError::Http {
            status: 503,
            message: "Service Unavailable".to_string(),
        };

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "Http");
        assert_eq!(json["details"]["status"], 503);
        assert_eq!(serde_json::from_value::<ChartsError>(json).unwrap(), error);
    }

    #[test]
    fn test_missing_column_message() {
        let error = ChartsError::MissingColumn {
            role: ColumnRole::YAxis,
            column: "read_bytes".to_string(),
            series: "series 'Reads'".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("y axis column read_bytes"));
        assert!(message.contains("Reads"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        match ChartsError::from(err) {
            ChartsError::Decode { message, line } => {
                assert!(!message.is_empty());
                assert_eq!(line, None);
            }
            other => panic!("Wrong error variant: {other:?}"),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(ChartsError::MissingBody.is_transient());
        assert!(!ChartsError::Cancelled.is_transient());
        assert!(!ChartsError::decode_at(3, "bad").is_transient());
    }
}
