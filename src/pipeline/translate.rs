//! Translation: send page text to the model and return paragraph HTML.
//!
//! The remote call sits behind [`TranslationBackend`] so the adapter can be
//! driven by a substitute in tests. [`LlmBackend`] is the production backend
//! over an `edgequake-llm` provider. Prompt wording lives in
//! [`crate::prompts`].
//!
//! ## Failure policy
//!
//! [`TranslationAdapter::translate`] never panics and never propagates a
//! transport error as anything but [`TranslationError`]: the caller always
//! gets something it can render. Each attempt is bounded by
//! `api_timeout_secs`; with `max_retries > 0` failed attempts are retried
//! with exponential backoff (`retry_backoff_ms * 2^attempt`).

use crate::config::{TranslatorConfig, MAX_RETRY_DELAY_MS};
use crate::error::{BackendError, PdfTranslateError, TranslationError};
use crate::pipeline::{format, postprocess};
use crate::prompts::build_translation_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// One completed remote call.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A chat-completion capability: one user message in, one answer out.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send `prompt` as a single user message and return the primary answer.
    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError>;
}

/// [`TranslationBackend`] over an `edgequake-llm` provider.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    name: String,
}

impl LlmBackend {
    /// Wrap an already-built provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &TranslatorConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            name: config
                .provider_name
                .clone()
                .unwrap_or_else(|| "llm".to_string()),
        }
    }

    /// Resolve the provider from `config` and the environment.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self, PdfTranslateError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TranslationBackend for LlmBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| BackendError(e.to_string()))?;

        Ok(Completion {
            content: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}

/// Translates page text and formats the answer as paragraph HTML.
#[derive(Clone)]
pub struct TranslationAdapter {
    backend: Arc<dyn TranslationBackend>,
    config: TranslatorConfig,
}

impl TranslationAdapter {
    pub fn new(backend: Arc<dyn TranslationBackend>, config: TranslatorConfig) -> Self {
        Self { backend, config }
    }

    /// Build an adapter over the provider resolved from `config`.
    pub fn from_config(config: TranslatorConfig) -> Result<Self, PdfTranslateError> {
        let backend = LlmBackend::from_config(&config)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate `raw_text` and return it as `<p>` blocks.
    ///
    /// Text that is empty after trimming (e.g. a scanned page) is not sent;
    /// the result is empty markup.
    pub async fn translate(&self, raw_text: &str) -> Result<String, TranslationError> {
        if raw_text.trim().is_empty() {
            debug!("Page has no extractable text; skipping remote call");
            return Ok(String::new());
        }

        let text = truncate_chars(raw_text, self.config.max_input_chars);
        if text.len() < raw_text.len() {
            warn!(
                "Page text truncated to {} characters before translation",
                self.config.max_input_chars
            );
        }

        let prompt = build_translation_prompt(
            self.config.instruction.as_deref(),
            &self.config.target_language,
            text,
        );

        let completion = self.complete_with_retry(&prompt).await?;
        let cleaned = postprocess::clean_translation(&completion.content);
        if cleaned.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(format::format_paragraphs(&cleaned))
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<Completion, TranslationError> {
        let start = Instant::now();
        let secs = self.config.api_timeout_secs;
        let mut last_err = TranslationError::Timeout { secs };

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = retry_delay_ms(self.config.retry_backoff_ms, attempt);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    self.backend.name(),
                    attempt,
                    self.config.max_retries,
                    backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(Duration::from_secs(secs), self.backend.complete(prompt)).await {
                Ok(Ok(completion)) => {
                    debug!(
                        "{}: {} input tokens, {} output tokens, {:?}",
                        self.backend.name(),
                        completion.input_tokens,
                        completion.output_tokens,
                        start.elapsed()
                    );
                    return Ok(completion);
                }
                Ok(Err(e)) => {
                    warn!(
                        "{}: attempt {} failed — {}",
                        self.backend.name(),
                        attempt + 1,
                        e
                    );
                    last_err = TranslationError::Remote {
                        detail: e.to_string(),
                        retries: attempt,
                    };
                }
                Err(_) => {
                    warn!(
                        "{}: attempt {} timed out after {}s",
                        self.backend.name(),
                        attempt + 1,
                        secs
                    );
                    last_err = TranslationError::Timeout { secs };
                }
            }
        }

        Err(last_err)
    }
}

/// Delay before retry `attempt` (1-based): `base_ms * 2^(attempt-1)`,
/// saturating and capped at [`MAX_RETRY_DELAY_MS`].
fn retry_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    base_ms.saturating_mul(factor).min(MAX_RETRY_DELAY_MS)
}

/// Keep at most `max_chars` characters, cutting on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build `CompletionOptions` from the translator config.
fn build_options(config: &TranslatorConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfTranslateError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`crate::config::DEFAULT_MODEL`]; the factory reads the matching API key.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(
    config: &TranslatorConfig,
) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.effective_model());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", config.effective_model());
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfTranslateError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
