//! Custom error types for autocvlac.
//!
//! Fetch, decode and export failures surface as `CvlacError`. Records that
//! cannot be turned into a form payload are not errors: extraction returns
//! `None` and the caller decides whether to skip or log.

use thiserror::Error;

/// Main error type for autocvlac operations.
#[derive(Debug, Error)]
pub enum CvlacError {
    /// Transport-level HTTP failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Impactu answered with a non-2xx status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Human-readable message
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `CvlacError`
pub type Result<T> = std::result::Result<T, CvlacError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| CvlacError::Parse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CvlacError::Api {
            code: 404,
            message: "Not research products for: 123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 404 - Not research products for: 123"
        );
    }

    #[test]
    fn test_ok_or_parse() {
        let missing: Option<i32> = None;
        let err = missing.ok_or_parse("no data array").unwrap_err();
        assert!(matches!(err, CvlacError::Parse(ref m) if m == "no data array"));
        assert_eq!(Some(3).ok_or_parse("unused").unwrap(), 3);
    }
}
