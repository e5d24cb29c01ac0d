//! Error types for upstream providers and local storage.

use thiserror::Error;

/// Errors raised while fetching, parsing or storing flare and market data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Transport failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured client timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body, possibly empty.
        message: String,
    },

    /// HTTP 429 from the upstream.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Successful response whose body reports a failure (quota notes, bad symbols).
    #[error("{provider} reported: {message}")]
    Upstream {
        /// Provider that produced the message.
        provider: String,
        /// Message from the payload.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider settings are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every provider in a chain failed or returned nothing.
    #[error("no market provider succeeded (tried: {})", attempted.join(", "))]
    NoProvider {
        /// Provider names in the order they were tried.
        attempted: Vec<String>,
    },

    /// Reading or writing a CSV file failed.
    #[error("CSV error for {path}: {source}")]
    Csv {
        /// File involved.
        path: String,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
}

impl DataError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates an upstream-reported error.
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wraps a CSV error with the file it came from.
    pub fn csv(path: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Returns true if retrying later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DataError::api(503, "unavailable").to_string(),
            "API error: 503 - unavailable"
        );
        assert_eq!(
            DataError::upstream("alpha_vantage", "quota reached").to_string(),
            "alpha_vantage reported: quota reached"
        );
        assert_eq!(
            DataError::NoProvider {
                attempted: vec!["alpha_vantage".into(), "yahoo".into()]
            }
            .to_string(),
            "no market provider succeeded (tried: alpha_vantage, yahoo)"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DataError::Network("reset".into()).is_retryable());
        assert!(DataError::RateLimit { retry_after_secs: 60 }.is_retryable());
        assert!(DataError::api(502, "").is_retryable());
        assert!(!DataError::api(404, "").is_retryable());
        assert!(!DataError::Parse("bad".into()).is_retryable());
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let err: DataError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, DataError::Parse(_)));
    }
}
