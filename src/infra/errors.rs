// src/infra/errors.rs — Error types for decora

use thiserror::Error;

/// Failures at the external service boundary or in the app's own plumbing.
///
/// Stop conditions (iteration cap, budget ceiling, user stop) are not
/// errors; they travel as `StopReason` in the published run state.
#[derive(Error, Debug)]
pub enum DecoraError {
    // Provider errors (possibly retriable)
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("{phase} call timed out after {seconds}s")]
    Timeout { phase: &'static str, seconds: u64 },

    #[error("{phase} returned an empty result")]
    EmptyResult { phase: &'static str },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DecoraError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            DecoraError::Provider {
                retriable: true,
                ..
            } | DecoraError::RateLimited { .. }
                | DecoraError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_provider_error() {
        let e = DecoraError::Provider {
            provider: "openai".into(),
            message: "connection reset".into(),
            retriable: true,
        };
        assert!(e.is_retriable());
    }

    #[test]
    fn test_non_retriable_provider_error() {
        let e = DecoraError::Provider {
            provider: "openai".into(),
            message: "invalid api key".into(),
            retriable: false,
        };
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_timeout_is_retriable() {
        let e = DecoraError::Timeout {
            phase: "synthesis",
            seconds: 60,
        };
        assert!(e.is_retriable());
        assert_eq!(e.to_string(), "synthesis call timed out after 60s");
    }

    #[test]
    fn test_empty_result_display() {
        let e = DecoraError::EmptyResult { phase: "decision" };
        assert_eq!(e.to_string(), "decision returned an empty result");
        assert!(!e.is_retriable());
    }
}
