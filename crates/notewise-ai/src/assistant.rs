//! Conversational session on top of an [`AiService`].
//!
//! The session is the one place where provider failures turn into a
//! user-facing apology: [`AssistantSession::ask`] records the error in the
//! session state and returns [`defaults::FALLBACK_ERROR_MESSAGE`] instead of
//! propagating it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use notewise_core::{defaults, AiService, ConversationMessage, Error, Result, Role};

/// Observable state of an assistant session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantState {
    pub is_active: bool,
    pub current_response: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub conversation_history: Vec<ConversationMessage>,
}

/// A single user's conversation with an AI provider.
pub struct AssistantSession {
    service: Arc<dyn AiService>,
    state: AssistantState,
}

impl AssistantSession {
    pub fn new(service: Arc<dyn AiService>) -> Self {
        Self {
            service,
            state: AssistantState::default(),
        }
    }

    /// Resume from previously stored state.
    pub fn with_state(service: Arc<dyn AiService>, state: AssistantState) -> Self {
        Self { service, state }
    }

    pub fn state(&self) -> &AssistantState {
        &self.state
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.state.conversation_history
    }

    pub fn service(&self) -> &Arc<dyn AiService> {
        &self.service
    }

    /// Open the session. Clears both the session error and the provider's
    /// recorded failure.
    pub fn activate(&mut self) {
        self.state.is_active = true;
        self.state.error = None;
        self.service.clear_last_error();
        info!(
            subsystem = "assistant",
            provider = self.service.provider_name(),
            "Assistant activated"
        );
    }

    pub fn deactivate(&mut self) {
        self.state.is_active = false;
        self.state.is_loading = false;
        info!(subsystem = "assistant", "Assistant deactivated");
    }

    pub fn clear_history(&mut self) {
        self.state.conversation_history.clear();
        self.state.current_response = None;
    }

    /// Send `prompt` to the provider and record the exchange.
    ///
    /// Provider failures never surface here: the reply is the fallback
    /// apology and the error text is kept in [`AssistantState::error`].
    pub async fn ask(&mut self, prompt: &str, context: Option<&str>) -> Result<String> {
        if !self.state.is_active {
            return Err(Error::InvalidInput(
                "assistant session is not active".to_string(),
            ));
        }

        self.state
            .conversation_history
            .push(ConversationMessage::new(Role::User, prompt));
        self.state.is_loading = true;
        self.state.error = None;

        let outcome = self.service.generate_response(prompt, context).await;
        self.state.is_loading = false;

        let reply = match outcome {
            Ok(reply) => {
                debug!(
                    subsystem = "assistant",
                    response_len = reply.len(),
                    "Assistant replied"
                );
                self.state
                    .conversation_history
                    .push(ConversationMessage::new(Role::Assistant, reply.clone()));
                reply
            }
            Err(err) => {
                warn!(
                    subsystem = "assistant",
                    error = %err,
                    "Provider failed, showing fallback reply"
                );
                self.state.error = Some(err.to_string());
                defaults::FALLBACK_ERROR_MESSAGE.to_string()
            }
        };

        self.state.current_response = Some(reply.clone());
        Ok(reply)
    }
}
