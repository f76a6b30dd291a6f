//! Centralized default constants for notewise.
//!
//! **This module is the single source of truth** for shared default values.
//! Providers, the configuration loader and the assistant session reference
//! these constants instead of defining their own magic numbers.

// =============================================================================
// REQUEST POLICY
// =============================================================================

/// Deadline for a single provider call, in milliseconds.
pub const TIMEOUT_MS: u64 = 30_000;

/// Maximum attempts per provider call, including the first one.
pub const MAX_RETRIES: u32 = 3;

/// Multiplier applied to the retry delay after each failed attempt.
pub const BACKOFF_FACTOR: u32 = 2;

/// Delay before the second attempt, in milliseconds.
pub const INITIAL_RETRY_DELAY_MS: u64 = 1_000;

// =============================================================================
// CHAT COMPLETION PROVIDER
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Required prefix of a provider credential.
pub const API_KEY_PREFIX: &str = "sk-";

/// Response header carrying the remaining request budget.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Response header carrying the request budget per window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Response header carrying seconds until the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

// =============================================================================
// USER-FACING TEXT
// =============================================================================

/// Shown to the user when a request failed after all retries.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "I apologize, but I encountered an issue processing your request. Please try again.";

/// Returned when the provider produced an empty reply.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response generated";

/// Returned when the provider produced an empty summary.
pub const NO_SUMMARY_PLACEHOLDER: &str = "Unable to generate summary";
