//! AI service configuration.
//!
//! A [`ServiceConfig`] selects the provider and carries its connection
//! settings. It can be built in code, read from `NOTEWISE_AI_*` environment
//! variables, or loaded from the `[ai]` table of a TOML file:
//!
//! ```toml
//! [ai]
//! provider = "openai"
//! api_key = "${OPENAI_API_KEY}"
//! timeout_ms = 20000
//! max_retries = 2
//! ```
//!
//! `${VAR}` references in the file are replaced from the environment before
//! parsing; unknown variables are left as written.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use notewise_core::{defaults, Error};

use crate::retry::RetryPolicy;

pub const ENV_PROVIDER: &str = "NOTEWISE_AI_PROVIDER";
pub const ENV_API_KEY: &str = "NOTEWISE_AI_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "NOTEWISE_AI_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "NOTEWISE_AI_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "NOTEWISE_AI_MAX_RETRIES";
pub const ENV_MODEL: &str = "NOTEWISE_AI_MODEL";

static ENV_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env reference pattern is valid")
});

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::FileRead(io) => Error::Io(io),
            other => Error::Config(other.to_string()),
        }
    }
}

/// Which backend a service is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions over HTTP.
    Primary,
    /// Canned answers with simulated latency.
    #[default]
    Simulated,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "openai",
            Self::Simulated => "mock",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "primary" => Ok(Self::Primary),
            "mock" | "simulated" => Ok(Self::Simulated),
            _ => Err(Error::UnsupportedProvider(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider selection plus connection settings.
///
/// Unset numeric settings, and settings set to zero, fall back to the
/// defaults in [`notewise_core::defaults`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub model: Option<String>,
    /// Wait before the first retry, in milliseconds.
    pub retry_delay_ms: Option<u64>,
}

// The API key never reaches logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("model", &self.model)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

#[derive(Deserialize)]
struct TomlRoot {
    ai: TomlServiceConfig,
}

#[derive(Deserialize)]
struct TomlServiceConfig {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    max_retries: Option<u32>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    retry_delay_ms: Option<u64>,
}

impl ServiceConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Effective per-attempt deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(
            self.timeout_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults::TIMEOUT_MS),
        )
    }

    /// Effective attempt budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
            .filter(|n| *n > 0)
            .unwrap_or(defaults::MAX_RETRIES)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(defaults::OPENAI_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(defaults::CHAT_MODEL)
    }

    /// Backoff policy derived from the retry settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_retries());
        match self.retry_delay_ms {
            Some(ms) => policy.with_initial_delay(Duration::from_millis(ms)),
            None => policy,
        }
    }

    /// Load from `NOTEWISE_AI_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// Empty values count as unset. Unparseable numbers are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get(ENV_PROVIDER) {
            Some(name) => name.parse()?,
            None => ProviderKind::Simulated,
        };

        let config = Self {
            provider,
            api_key: get(ENV_API_KEY).or_else(|| get(ENV_OPENAI_API_KEY)),
            base_url: get(ENV_BASE_URL),
            timeout_ms: get(ENV_TIMEOUT_MS).and_then(|s| s.trim().parse().ok()),
            max_retries: get(ENV_MAX_RETRIES).and_then(|s| s.trim().parse().ok()),
            model: get(ENV_MODEL),
            retry_delay_ms: None,
        };

        config.validate()?;
        debug!(subsystem = "config", config = ?config, "Loaded AI config from environment");
        Ok(config)
    }

    /// Load from the `[ai]` table of a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[ai]` table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let content = substitute_env_vars(content);
        let root: TomlRoot = toml::from_str(&content).map_err(ConfigError::from)?;
        let ai = root.ai;

        let provider = match ai.provider {
            Some(name) => name.parse()?,
            None => ProviderKind::Simulated,
        };

        let config = Self {
            provider,
            api_key: ai.api_key,
            base_url: ai.base_url,
            timeout_ms: ai.timeout_ms,
            max_retries: ai.max_retries,
            model: ai.model,
            retry_delay_ms: ai.retry_delay_ms,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check settings that can be judged without contacting the provider.
    ///
    /// Credentials are checked by the provider itself at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "base_url must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "model cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Replace `${VAR_NAME}` references with environment values.
fn substitute_env_vars(content: &str) -> String {
    ENV_REF
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}
