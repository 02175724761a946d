//! Hugging Face text-generation provider.
//!
//! Talks to a text-generation-inference server (`POST /generate`) or the
//! hosted Inference API (`POST /models/{model}`). Both accept the same
//! request body; the former answers with an object and the latter with a
//! one-element array.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use service_core::observability::trace_headers;
use std::time::Duration;

/// Hugging Face provider configuration.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Full URL the generation request is posted to.
    pub endpoint: String,
    pub model: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

/// Hugging Face text provider.
pub struct HuggingFaceTextProvider {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceTextProvider {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl TextProvider for HuggingFaceTextProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                repetition_penalty: params.repetition_penalty,
                do_sample: params.do_sample,
            },
        };

        tracing::debug!(
            model = %self.config.model,
            endpoint = %self.config.endpoint,
            prompt_len = prompt.len(),
            max_new_tokens = params.max_new_tokens,
            "Sending request to Hugging Face endpoint"
        );

        let response = self
            .authorize(self.client.post(&self.config.endpoint))
            .headers(trace_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_to_error(status, error_text));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(ProviderResponse {
            text: body.into_text(),
            input_tokens: None,
            output_tokens: None,
            finish_reason: FinishReason::Complete,
        })
    }

    /// Reachability probe: any answer below 500 means the server is up.
    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.endpoint.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Hugging Face endpoint not configured".to_string(),
            ));
        }

        let response = self
            .authorize(self.client.get(&self.config.endpoint))
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status().is_server_error() {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        } else {
            Ok(())
        }
    }
}

fn status_to_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest(body)
        }
        _ => ProviderError::ApiError(format!("Hugging Face API error {}: {}", status, body)),
    }
}

// ============================================================================
// Hugging Face API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
    repetition_penalty: f32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Single(GeneratedText),
    Batch(Vec<GeneratedText>),
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerateResponse::Single(output) => Some(output.generated_text),
            GenerateResponse::Batch(outputs) => {
                outputs.into_iter().next().map(|o| o.generated_text)
            }
        }
    }
}
