//! OpenAI-compatible chat-completion provider.
//!
//! Works with any endpoint that speaks the `/chat/completions` wire format:
//! OpenAI itself, Azure OpenAI, or a local proxy.
//!
//! # Example
//!
//! ```rust,no_run
//! use notewise_ai::config::{ProviderKind, ServiceConfig};
//! use notewise_ai::openai::OpenAiService;
//! use notewise_core::AiService;
//!
//! #[tokio::main]
//! async fn main() -> notewise_core::Result<()> {
//!     let config = ServiceConfig::new(ProviderKind::Primary)
//!         .with_api_key(std::env::var("OPENAI_API_KEY").unwrap_or_default());
//!     let service = OpenAiService::new(&config)?;
//!
//!     let reply = service
//!         .generate_response("What did I plan for Friday?", Some("Friday: dentist at 3pm"))
//!         .await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
mod parse;
mod types;

pub use backend::{
    rate_limit_from_headers, validate_api_key, CompletionParams, OpenAiService,
    ANALYZE_INPUT_LIMIT, ANALYZE_PARAMS, ANALYZE_SYSTEM_PROMPT, GENERATE_PARAMS,
    GENERATE_SYSTEM_PROMPT, SUMMARIZE_INPUT_LIMIT, SUMMARIZE_PARAMS, SUMMARIZE_SYSTEM_PROMPT,
};
pub use error::{signal_from_status, signal_from_transport};
pub use parse::{parse_analysis_response, DEFAULT_KEY_POINT, DEFAULT_SUMMARY, DEFAULT_TAG};
pub use types::*;
