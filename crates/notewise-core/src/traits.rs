//! Core traits for notewise abstractions.
//!
//! [`AiService`] is the capability contract every provider satisfies. Callers
//! hold providers as `Arc<dyn AiService>` and never see which backend they got.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NoteAnalysis, ServiceStatus};

/// AI assistant backend.
///
/// Content operations are independent: overlapping calls on one instance are
/// not serialized, and status updates from them are last-writer-wins.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Produce a single reply to `prompt`.
    ///
    /// `context`, when given, is supplied to the model ahead of the prompt as
    /// grounding material. A successful reply is never empty.
    async fn generate_response(&self, prompt: &str, context: Option<&str>) -> Result<String>;

    /// Produce a fully populated analysis of a note.
    async fn analyze_note(&self, note_content: &str) -> Result<NoteAnalysis>;

    /// Produce a short summary of `text`.
    async fn summarize_text(&self, text: &str) -> Result<String>;

    /// Current status of this instance. Pure read.
    fn service_status(&self) -> ServiceStatus;

    /// Forget the most recently recorded failure.
    ///
    /// This is the only operation that clears `last_error`.
    fn clear_last_error(&self);

    /// Short identifier used in logs.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use std::sync::{Arc, Mutex};

    struct EchoService {
        last_error: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AiService for EchoService {
        async fn generate_response(&self, prompt: &str, context: Option<&str>) -> Result<String> {
            Ok(match context {
                Some(ctx) => format!("{ctx} / {prompt}"),
                None => prompt.to_string(),
            })
        }

        async fn analyze_note(&self, note_content: &str) -> Result<NoteAnalysis> {
            Ok(NoteAnalysis {
                summary: note_content.to_string(),
                key_points: vec![note_content.to_string()],
                suggested_tags: vec![],
                sentiment: Sentiment::Neutral,
            })
        }

        async fn summarize_text(&self, text: &str) -> Result<String> {
            Ok(text.to_string())
        }

        fn service_status(&self) -> ServiceStatus {
            let last_error = self.last_error.lock().unwrap().clone();
            ServiceStatus {
                available: last_error.is_none(),
                rate_limit: None,
                last_error,
            }
        }

        fn clear_last_error(&self) {
            *self.last_error.lock().unwrap() = None;
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let service: Arc<dyn AiService> = Arc::new(EchoService {
            last_error: Mutex::new(Some("stale".to_string())),
        });

        let reply = service
            .generate_response("question", Some("notes"))
            .await
            .unwrap();
        assert_eq!(reply, "notes / question");
        assert!(!service.service_status().available);

        service.clear_last_error();
        assert!(service.service_status().available);
        assert_eq!(service.provider_name(), "echo");
    }
}
