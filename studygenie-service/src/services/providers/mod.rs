//! Text generation provider abstractions and implementations.
//!
//! The model itself is an opaque capability: a prompt goes in, text comes
//! out. Backends implement [`TextProvider`] so the rest of the service never
//! depends on a particular inference API.

pub mod gemini;
pub mod huggingface;
pub mod mock;

use crate::config::{ProviderConfig, ProviderKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Stable snake_case code for logs, metrics and error details.
    pub fn reason(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text, if the backend returned any.
    pub text: Option<String>,

    /// Input tokens consumed, when the backend reports them.
    pub input_tokens: Option<u32>,

    /// Output tokens generated, when the backend reports them.
    pub output_tokens: Option<u32>,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,

    pub temperature: f32,

    /// Multiplicative penalty on already generated tokens (1.0 = none).
    pub repetition_penalty: f32,

    /// Sample from the distribution instead of greedy decoding.
    pub do_sample: bool,
}

/// Trait for text generation backends.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short backend name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Generate a completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Build the provider selected in configuration.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn TextProvider>, ProviderError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let provider: Arc<dyn TextProvider> = match config.kind {
        ProviderKind::HuggingFace => Arc::new(huggingface::HuggingFaceTextProvider::new(
            huggingface::HuggingFaceConfig {
                endpoint: config.inference_url.clone(),
                model: config.model.clone(),
                api_token: config.hf_api_token.clone(),
                timeout,
            },
        )?),
        ProviderKind::Gemini => {
            let api_key = config.google_api_key.clone().ok_or_else(|| {
                ProviderError::NotConfigured(
                    "GOOGLE_API_KEY is required for the gemini provider".to_string(),
                )
            })?;
            Arc::new(gemini::GeminiTextProvider::new(gemini::GeminiConfig {
                api_key,
                model: config.model.clone(),
                timeout,
                base_url: gemini::GEMINI_API_BASE.to_string(),
            })?)
        }
        ProviderKind::Mock => Arc::new(mock::MockTextProvider::new(true)),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config(kind: ProviderKind) -> ProviderConfig {
        ProviderConfig {
            kind,
            inference_url: "http://localhost:8080/generate".to_string(),
            model: "google/flan-t5-small".to_string(),
            hf_api_token: None,
            google_api_key: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn builds_selected_provider() {
        let provider = from_config(&provider_config(ProviderKind::HuggingFace)).unwrap();
        assert_eq!(provider.name(), "huggingface");

        let provider = from_config(&provider_config(ProviderKind::Mock)).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn gemini_requires_api_key() {
        let err = from_config(&provider_config(ProviderKind::Gemini))
            .err()
            .expect("gemini without a key must fail");
        assert_eq!(err.reason(), "not_configured");

        let mut config = provider_config(ProviderKind::Gemini);
        config.google_api_key = Some("test-key".to_string());
        assert_eq!(from_config(&config).unwrap().name(), "gemini");
    }
}
