//! Prometheus metrics for studygenie-service.
//!
//! Provides HTTP and generation metrics for observability.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Generation metrics
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static STUDY_VALIDATION_REJECTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    INIT.call_once(register_metrics);
}

fn register_metrics() {
    let registry = Registry::new();

    let http_requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["endpoint", "status"],
    )
    .expect("Failed to create http_requests_total metric");

    let http_request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["endpoint"],
    )
    .expect("Failed to create http_request_duration_seconds metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "Text generation provider latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider"],
    )
    .expect("Failed to create genai_provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new(
            "genai_provider_errors_total",
            "Total text generation failures",
        ),
        &["provider", "reason"],
    )
    .expect("Failed to create genai_provider_errors_total metric");

    // type: input, output
    let tokens = IntCounterVec::new(
        Opts::new("genai_tokens_total", "Total tokens reported by providers"),
        &["provider", "type"],
    )
    .expect("Failed to create genai_tokens_total metric");

    let validation_rejections = IntCounterVec::new(
        Opts::new(
            "study_validation_rejections_total",
            "Requests rejected because the required field was empty",
        ),
        &["endpoint"],
    )
    .expect("Failed to create study_validation_rejections_total metric");

    registry
        .register(Box::new(http_requests_total.clone()))
        .expect("Failed to register http_requests_total");
    registry
        .register(Box::new(http_request_duration.clone()))
        .expect("Failed to register http_request_duration_seconds");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register genai_provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register genai_provider_errors_total");
    registry
        .register(Box::new(tokens.clone()))
        .expect("Failed to register genai_tokens_total");
    registry
        .register(Box::new(validation_rejections.clone()))
        .expect("Failed to register study_validation_rejections_total");

    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(http_request_duration);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = GENAI_TOKENS_TOTAL.set(tokens);
    let _ = STUDY_VALIDATION_REJECTIONS_TOTAL.set(validation_rejections);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a completed HTTP request.
pub fn record_http_request(endpoint: &str, status: u16, duration_secs: f64) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        let status = status.to_string();
        counter.with_label_values(&[endpoint, status.as_str()]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[endpoint])
            .observe(duration_secs);
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}

/// Record a generation failure.
pub fn record_provider_error(provider: &str, reason: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, reason]).inc();
    }
}

/// Record token usage. Providers that do not report counts are skipped.
pub fn record_tokens(provider: &str, input_tokens: Option<u32>, output_tokens: Option<u32>) {
    if let Some(counter) = GENAI_TOKENS_TOTAL.get() {
        if let Some(input) = input_tokens {
            counter
                .with_label_values(&[provider, "input"])
                .inc_by(u64::from(input));
        }
        if let Some(output) = output_tokens {
            counter
                .with_label_values(&[provider, "output"])
                .inc_by(u64::from(output));
        }
    }
}

/// Record an empty-field rejection.
pub fn record_validation_rejection(endpoint: &str) {
    if let Some(counter) = STUDY_VALIDATION_REJECTIONS_TOTAL.get() {
        counter.with_label_values(&[endpoint]).inc();
    }
}
