//! OpenAI-compatible chat-completion provider.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use notewise_core::{
    defaults, AiError, AiService, Error, NoteAnalysis, RateLimitInfo, Result, ServiceStatus,
};

use crate::classify::classify;
use crate::config::ServiceConfig;
use crate::retry::{with_retry, RetryPolicy};
use crate::timeout::with_timeout;

use super::error::{signal_from_status, signal_from_transport};
use super::parse::parse_analysis_response;
use super::types::*;

pub const GENERATE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that helps users with note-taking, organization, and knowledge management. Provide clear, concise, and helpful responses.";

pub const ANALYZE_SYSTEM_PROMPT: &str = "You are an expert at analyzing notes. Provide structured analysis with summary, key points, tags, and sentiment.";

pub const SUMMARIZE_SYSTEM_PROMPT: &str = "You are an expert at summarizing text. Provide concise, accurate summaries that capture the main points.";

/// Note characters sent for analysis.
pub const ANALYZE_INPUT_LIMIT: usize = 2000;

/// Text characters sent for summarization.
pub const SUMMARIZE_INPUT_LIMIT: usize = 3000;

/// Sampling parameters for one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

pub const GENERATE_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 500,
    temperature: 0.7,
};

pub const ANALYZE_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 300,
    temperature: 0.3,
};

pub const SUMMARIZE_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 200,
    temperature: 0.4,
};

/// Check that `api_key` looks like a provider credential.
pub fn validate_api_key(api_key: Option<&str>) -> std::result::Result<String, AiError> {
    let key = api_key.map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return Err(AiError::validation("API key is required"));
    }
    if !key.starts_with(defaults::API_KEY_PREFIX) {
        return Err(AiError::validation("Invalid API key format"));
    }
    Ok(key.to_string())
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Reset hints beyond this are ignored.
const MAX_RESET_SECS: f64 = 86_400.0 * 366.0;

/// Parse rate-limit headers from a successful response.
///
/// Remaining and limit must both be present; the reset header is a number of
/// seconds from now and is optional.
pub fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let read = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim);

    let remaining = read(defaults::RATE_LIMIT_REMAINING_HEADER)?.parse().ok()?;
    let limit = read(defaults::RATE_LIMIT_LIMIT_HEADER)?.parse().ok()?;
    let reset_at = read(defaults::RATE_LIMIT_RESET_HEADER)
        .map(|v| v.trim_end_matches('s'))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && (0.0..MAX_RESET_SECS).contains(secs))
        .and_then(|secs| chrono::Duration::from_std(Duration::from_secs_f64(secs)).ok())
        .map(|delta| Utc::now() + delta);

    Some(RateLimitInfo {
        remaining,
        limit,
        reset_at,
    })
}

/// A completed chat call.
#[derive(Debug)]
struct Completion {
    content: Option<String>,
    rate_limit: Option<RateLimitInfo>,
}

/// Everything one HTTP attempt needs, owned so it can run as its own task.
#[derive(Clone)]
struct Transport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl Transport {
    /// One attempt. Failures come back already classified.
    async fn complete(self, request: ChatCompletionRequest) -> Result<Completion> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from(classify(&signal_from_transport(&e))))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(&signal_from_status(status.as_u16(), &body)).into());
        }

        let rate_limit = rate_limit_from_headers(response.headers());
        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::from(classify(&signal_from_transport(&e))))?;

        Ok(Completion {
            content: result.first_content().map(str::to_string),
            rate_limit,
        })
    }
}

#[derive(Debug, Default)]
struct StatusState {
    last_error: Option<String>,
    rate_limit: Option<RateLimitInfo>,
}

/// Chat-completion provider speaking the OpenAI wire format.
pub struct OpenAiService {
    transport: Transport,
    model: String,
    timeout: Duration,
    retry: RetryPolicy,
    status: Mutex<StatusState>,
}

impl std::fmt::Debug for OpenAiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiService")
            .field("endpoint", &self.transport.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl OpenAiService {
    /// Validate the credential and build the HTTP client.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = validate_api_key(config.api_key.as_deref())?;
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!("{}/chat/completions", config.base_url().trim_end_matches('/'));

        info!(
            subsystem = "ai",
            component = "openai",
            endpoint = %endpoint,
            model = config.model(),
            timeout_ms = config.timeout().as_millis() as u64,
            max_attempts = config.max_retries(),
            "Initializing chat completion provider"
        );

        Ok(Self {
            transport: Transport {
                client,
                endpoint,
                api_key,
            },
            model: config.model().to_string(),
            timeout: config.timeout(),
            retry: config.retry_policy(),
            status: Mutex::new(StatusState::default()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, StatusState> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send one chat request through the retry and timeout layers, then
    /// record the outcome.
    async fn chat(
        &self,
        op: &'static str,
        messages: Vec<ChatMessage>,
        params: CompletionParams,
    ) -> Result<Option<String>> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(params.temperature),
            max_tokens: Some(params.max_tokens),
        };

        debug!(
            subsystem = "ai",
            component = "openai",
            op,
            model = %self.model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let start = Instant::now();
        let result = with_retry(&self.retry, || {
            let transport = self.transport.clone();
            with_timeout(transport.complete(request.clone()), self.timeout)
        })
        .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(completion) => {
                if let Some(rate_limit) = completion.rate_limit {
                    self.lock_status().rate_limit = Some(rate_limit);
                }
                debug!(
                    subsystem = "ai",
                    component = "openai",
                    op,
                    duration_ms,
                    response_len = completion.content.as_deref().map_or(0, str::len),
                    success = true,
                    "Chat completion finished"
                );
                Ok(completion.content)
            }
            Err(err) => {
                warn!(
                    subsystem = "ai",
                    component = "openai",
                    op,
                    duration_ms,
                    error_kind = err.as_ai().map(|e| e.kind.as_str()),
                    status_code = err.as_ai().and_then(|e| e.status_code),
                    error = %err,
                    success = false,
                    "Chat completion failed"
                );
                self.lock_status().last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

fn with_context(system: &str, context: Option<&str>, user: String) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system)];
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        messages.push(ChatMessage::system(format!(
            "Context from user's notes: {}",
            context
        )));
    }
    messages.push(ChatMessage::user(user));
    messages
}

#[async_trait]
impl AiService for OpenAiService {
    #[instrument(skip(self, prompt, context), fields(subsystem = "ai", component = "openai", op = "generate_response", prompt_len = prompt.len()))]
    async fn generate_response(&self, prompt: &str, context: Option<&str>) -> Result<String> {
        let messages = with_context(GENERATE_SYSTEM_PROMPT, context, prompt.to_string());
        let content = self.chat("generate_response", messages, GENERATE_PARAMS).await?;
        Ok(content.unwrap_or_else(|| defaults::NO_RESPONSE_PLACEHOLDER.to_string()))
    }

    #[instrument(skip(self, note_content), fields(subsystem = "ai", component = "openai", op = "analyze_note", prompt_len = note_content.len()))]
    async fn analyze_note(&self, note_content: &str) -> Result<NoteAnalysis> {
        let prompt = format!(
            "Analyze the following note and provide:\n1. A brief summary\n2. 3-5 key points \n3. Suggested tags (comma-separated)\n4. Sentiment analysis (positive/negative/neutral)\n\nNote content: {}",
            truncate_chars(note_content, ANALYZE_INPUT_LIMIT)
        );
        let messages = with_context(ANALYZE_SYSTEM_PROMPT, None, prompt);
        let content = self.chat("analyze_note", messages, ANALYZE_PARAMS).await?;
        Ok(parse_analysis_response(content.as_deref().unwrap_or_default()))
    }

    #[instrument(skip(self, text), fields(subsystem = "ai", component = "openai", op = "summarize_text", prompt_len = text.len()))]
    async fn summarize_text(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Please summarize the following text: {}",
            truncate_chars(text, SUMMARIZE_INPUT_LIMIT)
        );
        let messages = with_context(SUMMARIZE_SYSTEM_PROMPT, None, prompt);
        let content = self.chat("summarize_text", messages, SUMMARIZE_PARAMS).await?;
        Ok(content.unwrap_or_else(|| defaults::NO_SUMMARY_PLACEHOLDER.to_string()))
    }

    fn service_status(&self) -> ServiceStatus {
        let status = self.lock_status();
        ServiceStatus {
            available: status.last_error.is_none(),
            rate_limit: status.rate_limit.clone(),
            last_error: status.last_error.clone(),
        }
    }

    fn clear_last_error(&self) {
        self.lock_status().last_error = None;
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use notewise_core::ErrorKind;
    use reqwest::header::HeaderValue;

    fn config() -> ServiceConfig {
        ServiceConfig::new(ProviderKind::Primary).with_api_key("sk-test-key")
    }

    #[test]
    fn test_validate_api_key_missing() {
        let err = validate_api_key(None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!err.retryable);
        assert_eq!(err.message, "API key is required");
    }

    #[test]
    fn test_validate_api_key_blank() {
        let err = validate_api_key(Some("   ")).unwrap_err();
        assert_eq!(err.message, "API key is required");
    }

    #[test]
    fn test_validate_api_key_wrong_prefix() {
        let err = validate_api_key(Some("pk-123")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Invalid API key format");
    }

    #[test]
    fn test_validate_api_key_trims() {
        assert_eq!(validate_api_key(Some("  sk-abc \n")).unwrap(), "sk-abc");
    }

    #[test]
    fn test_construction_rejects_bad_key() {
        let err = OpenAiService::new(&ServiceConfig::new(ProviderKind::Primary)).unwrap_err();
        let ai = err.as_ai().expect("validation error is classified");
        assert_eq!(ai.kind, ErrorKind::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_construction_defaults() {
        let service = OpenAiService::new(&config()).unwrap();
        assert_eq!(service.model(), "gpt-3.5-turbo");
        assert_eq!(
            service.transport.endpoint,
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(service.timeout, Duration::from_millis(30_000));
        assert_eq!(service.retry.max_attempts, 3);
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let service =
            OpenAiService::new(&config().with_base_url("http://localhost:9999/v1/")).unwrap();
        assert_eq!(
            service.transport.endpoint,
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_fresh_service_is_available() {
        let service = OpenAiService::new(&config()).unwrap();
        let status = service.service_status();
        assert!(status.available);
        assert!(status.last_error.is_none());
        assert!(status.rate_limit.is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let service = OpenAiService::new(&config()).unwrap();
        assert!(!format!("{:?}", service).contains("sk-test-key"));
    }

    #[test]
    fn test_context_message_is_inserted_between_system_and_user() {
        let messages = with_context("sys", Some("meeting on Friday"), "when?".to_string());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::system("sys"));
        assert_eq!(
            messages[1],
            ChatMessage::system("Context from user's notes: meeting on Friday")
        );
        assert_eq!(messages[2], ChatMessage::user("when?"));
    }

    #[test]
    fn test_blank_context_is_skipped() {
        let messages = with_context("sys", Some("  "), "hi".to_string());
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("20"));

        let before = Utc::now();
        let info = rate_limit_from_headers(&headers).unwrap();
        assert_eq!(info.remaining, 42);
        assert_eq!(info.limit, 60);
        let reset_at = info.reset_at.unwrap();
        assert!(reset_at >= before + chrono::Duration::seconds(20));
    }

    #[test]
    fn test_rate_limit_headers_accept_seconds_suffix() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("1"));
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("3"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1.5s"));

        assert!(rate_limit_from_headers(&headers).unwrap().reset_at.is_some());
    }

    #[test]
    fn test_rate_limit_headers_incomplete() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        assert!(rate_limit_from_headers(&headers).is_none());

        headers.insert("x-ratelimit-limit", HeaderValue::from_static("lots"));
        assert!(rate_limit_from_headers(&headers).is_none());
    }
}
