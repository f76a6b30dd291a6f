//! # notewise-ai
//!
//! AI provider implementations for the notewise assistant.
//!
//! This crate provides:
//! - A simulated provider with canned answers and injectable randomness
//! - An OpenAI-compatible chat-completion provider
//! - Retry with exponential backoff and a per-attempt deadline guard
//! - Failure classification into retryable and terminal errors
//! - Configuration from code, environment variables or TOML
//! - A conversational session that turns failures into a fallback reply
//!
//! # Example
//!
//! ```rust,no_run
//! use notewise_ai::{create_ai_service, AssistantSession, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> notewise_core::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let service = create_ai_service(&config)?;
//!
//!     let mut session = AssistantSession::new(service);
//!     session.activate();
//!     let reply = session.ask("Help me organize my week", None).await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod classify;
pub mod config;
pub mod factory;
pub mod openai;
pub mod retry;
pub mod simulated;
pub mod timeout;

// Re-export core types
pub use notewise_core::*;

pub use assistant::{AssistantSession, AssistantState};
pub use classify::{classify, FailureSignal};
pub use config::{ConfigError, ProviderKind, ServiceConfig};
pub use factory::{create_ai_service, create_ai_service_named};
pub use openai::OpenAiService;
pub use retry::{delay, with_retry, RetryPolicy};
pub use simulated::{LatencyProfile, RandomSource, ScriptedRandom, SimulatedAiService};
pub use timeout::with_timeout;
