use thiserror::Error;

/// Errors from the generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure (connect, DNS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status from the API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The per-call deadline elapsed; the in-flight request was cancelled.
    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The model returned nothing usable after sanitization.
    #[error("empty completion")]
    Empty,

    /// The content filter rejected the completion.
    #[error("content policy violation: {0}")]
    ContentPolicy(String),

    /// All attempts failed with transient errors.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl GenerationError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Request(_) | GenerationError::Timeout { .. } => true,
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        assert!(GenerationError::Api { status: 429, message: String::new() }.is_transient());
        assert!(GenerationError::Api { status: 503, message: String::new() }.is_transient());
        assert!(GenerationError::Timeout { secs: 30 }.is_transient());
        assert!(!GenerationError::Api { status: 401, message: String::new() }.is_transient());
        assert!(!GenerationError::Empty.is_transient());
        assert!(!GenerationError::ContentPolicy("spam".into()).is_transient());
    }
}
