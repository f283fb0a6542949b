//! Configuration for the translation adapter.
//!
//! The API credential and the model selector are explicit configuration
//! handed to [`crate::pipeline::translate::TranslationAdapter`] at
//! construction, never ambient globals read mid-request. Everything a
//! request needs beyond its own inputs lives in [`TranslatorConfig`].
//!
//! Credentials themselves stay out of this struct: the `edgequake-llm`
//! provider reads `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` / … when it is
//! built, or the caller passes a pre-built provider.

use crate::error::PdfTranslateError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Target language used when none is configured.
pub const DEFAULT_TARGET_LANGUAGE: &str = "Brazilian Portuguese";

/// Upper bound for [`TranslatorConfig::max_retries`].
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound for a single retry delay, in milliseconds.
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Configuration for page translation.
///
/// # Example
/// ```rust
/// use edgequake_pdf_translate::TranslatorConfig;
///
/// let config = TranslatorConfig::builder()
///     .target_language("German")
///     .model("gpt-4.1-mini")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.target_language, "German");
/// ```
#[derive(Clone)]
pub struct TranslatorConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses [`DEFAULT_MODEL`]
    /// or `EDGEQUAKE_MODEL`.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Language the page is translated into. Default: "Brazilian Portuguese".
    pub target_language: String,

    /// Instruction placed before the page text. `{language}` is replaced with
    /// `target_language`. If None, uses [`crate::prompts::DEFAULT_INSTRUCTION`].
    pub instruction: Option<String>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Retry attempts after a failed remote call. Default: 0 (single attempt).
    /// The builder clamps this to [`MAX_RETRIES_LIMIT`].
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 60.
    ///
    /// A hanging endpoint would otherwise block the request forever.
    pub api_timeout_secs: u64,

    /// Page text longer than this many characters is truncated before it is
    /// sent. Default: 12 000.
    pub max_input_chars: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            instruction: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            max_input_chars: 12_000,
        }
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("target_language", &self.target_language)
            .field("instruction", &self.instruction)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl TranslatorConfig {
    /// Create a new builder for `TranslatorConfig`.
    pub fn builder() -> TranslatorConfigBuilder {
        TranslatorConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will be requested from the provider.
    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`TranslatorConfig`].
#[derive(Debug)]
pub struct TranslatorConfigBuilder {
    config: TranslatorConfig,
}

impl TranslatorConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.config.target_language = language.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = Some(instruction.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(MAX_RETRIES_LIMIT);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslatorConfig, PdfTranslateError> {
        let c = &self.config;
        if c.target_language.trim().is_empty() {
            return Err(PdfTranslateError::InvalidConfig(
                "Target language must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_input_chars == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
