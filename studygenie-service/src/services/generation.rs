//! Generation adapter: one call shape for every study endpoint.
//!
//! Owns the fixed sampling configuration and turns provider outcomes into
//! either trimmed text or a [`GenerationError`] with a reason code. Callers
//! that want the fail-soft behaviour use [`Generator::generate_or_sentinel`].

use crate::services::metrics;
use crate::services::providers::{FinishReason, GenerationParams, ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Text returned in place of a generation result when generation fails.
pub const GENERATION_FAILED: &str = "Error: Unable to generate response.";

/// Sampling settings applied to every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub do_sample: bool,
    pub temperature: f32,
    pub repetition_penalty: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            do_sample: true,
            temperature: 0.7,
            repetition_penalty: 2.0,
        }
    }
}

impl SamplingConfig {
    fn params(&self, max_new_tokens: u32) -> GenerationParams {
        GenerationParams {
            max_new_tokens,
            temperature: self.temperature,
            repetition_penalty: self.repetition_penalty,
            do_sample: self.do_sample,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Provider returned no text")]
    EmptyOutput,
}

impl GenerationError {
    pub fn reason(&self) -> &'static str {
        match self {
            GenerationError::Provider(err) => err.reason(),
            GenerationError::EmptyOutput => "empty_output",
        }
    }
}

/// Shared handle to the text generation backend.
///
/// Built once at startup and cloned into request handlers; clones share the
/// same provider.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn TextProvider>,
    sampling: SamplingConfig,
}

impl Generator {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.provider.health_check().await
    }

    /// Generate at most `max_new_tokens` tokens for `prompt`.
    #[tracing::instrument(
        skip(self, prompt),
        fields(provider = self.provider.name(), prompt_len = prompt.len())
    )]
    pub async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        let params = self.sampling.params(max_new_tokens);
        let provider = self.provider.name();

        let start = Instant::now();
        let outcome = self.provider.generate(prompt, &params).await;
        metrics::record_provider_latency(provider, start.elapsed().as_secs_f64());

        let result = outcome
            .map_err(GenerationError::from)
            .and_then(|response| {
                metrics::record_tokens(provider, response.input_tokens, response.output_tokens);
                if response.finish_reason == FinishReason::Length {
                    tracing::debug!(max_new_tokens, "Generation stopped at token budget");
                }

                response
                    .text
                    .map(|text| text.trim().to_string())
                    .ok_or(GenerationError::EmptyOutput)
            });

        match &result {
            Ok(text) => tracing::debug!(output_len = text.len(), "Generation completed"),
            Err(e) => {
                tracing::warn!(reason = e.reason(), error = %e, "Generation failed");
                metrics::record_provider_error(provider, e.reason());
            }
        }

        result
    }

    /// Like [`Generator::generate`], but any failure becomes [`GENERATION_FAILED`].
    pub async fn generate_or_sentinel(&self, prompt: &str, max_new_tokens: u32) -> String {
        self.generate(prompt, max_new_tokens)
            .await
            .unwrap_or_else(|_| GENERATION_FAILED.to_string())
    }
}
