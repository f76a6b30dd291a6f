//! Failure classification.
//!
//! Every provider failure is reduced to a [`FailureSignal`] and then mapped to
//! an [`AiError`] by [`classify`]. The mapping is the only place retryability
//! is decided.

use notewise_core::{AiError, ErrorKind};

/// Connection aborted before a response arrived.
pub const ECONNABORTED: &str = "ECONNABORTED";

/// Host name did not resolve.
pub const ENOTFOUND: &str = "ENOTFOUND";

/// Host refused the connection.
pub const ECONNREFUSED: &str = "ECONNREFUSED";

/// Raw description of a failed provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureSignal {
    /// The provider answered with a non-success HTTP status.
    Status {
        code: u16,
        /// Error detail from the provider's response body, if it sent one.
        detail: Option<String>,
        message: String,
    },
    /// Transport failure tagged with a network error code.
    Network { code: String, message: String },
    /// Anything else.
    Other(String),
}

impl FailureSignal {
    pub fn status(code: u16, detail: Option<String>) -> Self {
        Self::Status {
            code,
            detail,
            message: format!("Request failed with status code {}", code),
        }
    }

    pub fn network(code: &str, message: impl Into<String>) -> Self {
        Self::Network {
            code: code.to_string(),
            message: message.into(),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } | Self::Network { message, .. } => message,
            Self::Other(message) => message,
        }
    }
}

/// Map a failure to its classified error.
///
/// Priority: 429, then 5xx, then 4xx, then network codes, then everything else.
pub fn classify(signal: &FailureSignal) -> AiError {
    if let FailureSignal::Status { code, detail, message } = signal {
        let code = *code;
        if code == 429 {
            return AiError::new(ErrorKind::RateLimit, "Rate limit exceeded", true).with_status(code);
        }
        if code >= 500 {
            return AiError::new(ErrorKind::Api, "Server error", true).with_status(code);
        }
        if code >= 400 {
            let detail = detail.as_deref().unwrap_or(message);
            return AiError::new(ErrorKind::Api, format!("API error: {}", detail), false)
                .with_status(code);
        }
    }

    if let FailureSignal::Network { code, .. } = signal {
        match code.as_str() {
            ECONNABORTED => return AiError::new(ErrorKind::Timeout, "Request timeout", true),
            ENOTFOUND | ECONNREFUSED => {
                return AiError::new(ErrorKind::Network, "Network error", true)
            }
            _ => {}
        }
    }

    AiError::new(
        ErrorKind::Api,
        format!("Unexpected error: {}", signal.message()),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_is_retryable_rate_limit() {
        let err = classify(&FailureSignal::status(429, None));
        assert_eq!(err.kind, ErrorKind::RateLimit);
        assert!(err.retryable);
        assert_eq!(err.status_code, Some(429));
        assert_eq!(err.message, "Rate limit exceeded");
    }

    #[test]
    fn test_503_is_retryable_api() {
        let err = classify(&FailureSignal::status(503, None));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(err.retryable);
        assert_eq!(err.status_code, Some(503));
    }

    #[test]
    fn test_500_is_retryable_api() {
        let err = classify(&FailureSignal::status(500, Some("boom".to_string())));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(err.retryable);
        assert_eq!(err.message, "Server error");
    }

    #[test]
    fn test_404_is_fatal_api() {
        let err = classify(&FailureSignal::status(404, None));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(!err.retryable);
        assert_eq!(err.status_code, Some(404));
        assert_eq!(err.message, "API error: Request failed with status code 404");
    }

    #[test]
    fn test_4xx_uses_upstream_detail() {
        let err = classify(&FailureSignal::status(
            401,
            Some("Incorrect API key provided".to_string()),
        ));
        assert_eq!(err.message, "API error: Incorrect API key provided");
        assert!(!err.retryable);
    }

    #[test]
    fn test_connection_aborted_is_timeout() {
        let err = classify(&FailureSignal::network(ECONNABORTED, "socket hang up"));
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(err.retryable);
        assert_eq!(err.status_code, None);
    }

    #[test]
    fn test_connection_refused_is_network() {
        let err = classify(&FailureSignal::network(ECONNREFUSED, "connect failed"));
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.retryable);
    }

    #[test]
    fn test_dns_failure_is_network() {
        let err = classify(&FailureSignal::network(ENOTFOUND, "no such host"));
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.retryable);
    }

    #[test]
    fn test_unknown_network_code_is_unexpected() {
        let err = classify(&FailureSignal::network("EPIPE", "broken pipe"));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(!err.retryable);
        assert_eq!(err.message, "Unexpected error: broken pipe");
    }

    #[test]
    fn test_other_embeds_original_message() {
        let err = classify(&FailureSignal::Other("invalid JSON body".to_string()));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(!err.retryable);
        assert_eq!(err.message, "Unexpected error: invalid JSON body");
    }

    #[test]
    fn test_non_error_status_is_unexpected() {
        let err = classify(&FailureSignal::status(302, None));
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(!err.retryable);
        assert!(err.message.starts_with("Unexpected error:"));
    }
}
