use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Default outbound request timeout for providers.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub status_policy: StatusPolicy,
    /// OTLP collector endpoint; tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// URL generation requests are posted to (Hugging Face only).
    pub inference_url: String,
    pub model: String,
    pub hf_api_token: Option<String>,
    pub google_api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Which text generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    HuggingFace,
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown provider '{}', expected huggingface, gemini or mock",
                other
            ))),
        }
    }
}

/// How failures are mapped to HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Always 200; generation failures are embedded as the sentinel text.
    #[default]
    Compat,
    /// 400 for empty fields, 502 for generation failures.
    Strict,
}

impl FromStr for StatusPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compat" => Ok(StatusPolicy::Compat),
            "strict" => Ok(StatusPolicy::Strict),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown status policy '{}', expected compat or strict",
                other
            ))),
        }
    }
}

impl StudyConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the service settings from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let provider = ProviderConfig {
            kind: get("STUDYGENIE_PROVIDER", Some("huggingface"))?.parse()?,
            inference_url: get(
                "STUDYGENIE_INFERENCE_URL",
                Some("http://localhost:8080/generate"),
            )?,
            model: get("STUDYGENIE_MODEL", Some("google/flan-t5-small"))?,
            hf_api_token: lookup("HF_API_TOKEN").filter(|v| !v.is_empty()),
            google_api_key: lookup("GOOGLE_API_KEY").filter(|v| !v.is_empty()),
            timeout_secs: parse_timeout(&get(
                "STUDYGENIE_TIMEOUT_SECS",
                Some(&DEFAULT_TIMEOUT_SECS.to_string()),
            )?)?,
        };

        Ok(StudyConfig {
            common,
            provider,
            status_policy: get("STUDYGENIE_STATUS_POLICY", Some("compat"))?.parse()?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }
}

/// Timeout in whole seconds; must be positive.
fn parse_timeout(value: &str) -> Result<u64, AppError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "STUDYGENIE_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
            value
        ))),
    }
}

/// Defaults apply outside production; in production every key must be set.
fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
