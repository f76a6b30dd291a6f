//! Provider selection.

use std::sync::Arc;
use tracing::info;

use notewise_core::{AiService, Result};

use crate::config::{ProviderKind, ServiceConfig};
use crate::openai::OpenAiService;
use crate::simulated::SimulatedAiService;

/// Build the provider selected by `config`.
///
/// Construction errors (a bad credential, an invalid base URL) propagate
/// unchanged.
pub fn create_ai_service(config: &ServiceConfig) -> Result<Arc<dyn AiService>> {
    let service: Arc<dyn AiService> = match config.provider {
        ProviderKind::Primary => Arc::new(OpenAiService::new(config)?),
        ProviderKind::Simulated => Arc::new(SimulatedAiService::new()),
    };

    info!(
        subsystem = "ai",
        provider = service.provider_name(),
        "AI service created"
    );
    Ok(service)
}

/// Parse `name` as a provider and build it with `config`'s settings.
///
/// The provider field of `config` is ignored in favour of `name`.
pub fn create_ai_service_named(name: &str, config: &ServiceConfig) -> Result<Arc<dyn AiService>> {
    let provider: ProviderKind = name.parse()?;
    let config = ServiceConfig {
        provider,
        ..config.clone()
    };
    create_ai_service(&config)
}
