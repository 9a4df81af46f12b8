//! Quiz API error types.

use thiserror::Error;

/// Errors that can occur when talking to the quiz API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested quiz does not exist.
    #[error("quiz {0} not found")]
    NotFound(u64),

    /// The access token is missing or was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` if repeating the request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::Unauthorized(_) | ApiError::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanence() {
        assert!(ApiError::NotFound(3).is_permanent());
        assert!(ApiError::Unauthorized("bad token".into()).is_permanent());
        assert!(!ApiError::Timeout(30).is_permanent());
        assert!(!ApiError::RateLimited { retry_after_ms: 5000 }.is_permanent());
    }
}
