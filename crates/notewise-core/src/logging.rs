//! Structured logging field name constants for notewise.
//!
//! Every crate uses these names for structured `tracing` fields so log
//! aggregation can query provider calls consistently.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue: retry scheduled, failure recorded, fallback shown |
//! | INFO  | Lifecycle events (provider construction, session activation) |
//! | DEBUG | Decision points, request parameters, response sizes |
//! | TRACE | Per-line parsing detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "ai", "assistant", "config"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem: the provider name ("openai", "mock") or
/// the resilience layer ("retry", "timeout").
pub const COMPONENT: &str = "component";

/// Provider identifier as returned by `AiService::provider_name`.
pub const PROVIDER: &str = "provider";

/// Logical operation name.
/// Values: "generate_response", "analyze_note", "summarize_text"
pub const OPERATION: &str = "op";

// ─── Request fields ────────────────────────────────────────────────────────

/// Model name used for the completion.
pub const MODEL: &str = "model";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Output length cap sent to the provider.
pub const MAX_TOKENS: &str = "max_tokens";

/// Sampling temperature sent to the provider.
pub const TEMPERATURE: &str = "temperature";

// ─── Resilience fields ─────────────────────────────────────────────────────

/// 1-based attempt number within a retry loop.
pub const ATTEMPT: &str = "attempt";

/// Maximum attempts allowed by the retry policy.
pub const MAX_ATTEMPTS: &str = "max_attempts";

/// Backoff delay before the next attempt, in milliseconds.
pub const DELAY_MS: &str = "delay_ms";

/// Deadline applied to a call, in milliseconds.
pub const TIMEOUT_MS: &str = "timeout_ms";

/// Classified error kind.
pub const ERROR_KIND: &str = "error_kind";

/// Upstream HTTP status code.
pub const STATUS_CODE: &str = "status_code";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: [&str; 18] = [
        SUBSYSTEM,
        COMPONENT,
        PROVIDER,
        OPERATION,
        MODEL,
        PROMPT_LEN,
        RESPONSE_LEN,
        MAX_TOKENS,
        TEMPERATURE,
        ATTEMPT,
        MAX_ATTEMPTS,
        DELAY_MS,
        TIMEOUT_MS,
        ERROR_KIND,
        STATUS_CODE,
        DURATION_MS,
        SUCCESS,
        ERROR_MSG,
    ];

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_field_names_are_plain_identifiers() {
        // Must be usable verbatim as `tracing` field keys.
        for name in ALL {
            assert!(!name.is_empty());
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
