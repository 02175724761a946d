//! Router-level tests for the study endpoints.
//!
//! These drive the full router with `oneshot` and a mock provider, so no
//! network or model is needed.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use studygenie_service::config::StatusPolicy;
use studygenie_service::services::providers::mock::MockTextProvider;
use studygenie_service::services::Generator;
use studygenie_service::startup::{build_router, AppState};
use tower::ServiceExt;

const SENTINEL: &str = "Error: Unable to generate response.";

/// (endpoint, field, empty-field message)
const ENDPOINTS: [(&str, &str, &str); 5] = [
    ("/explain", "topic", "Topic cannot be empty"),
    ("/flashcard", "topic", "Topic cannot be empty"),
    ("/summarize", "notes", "Notes cannot be empty"),
    ("/exam_tips", "topic", "Topic cannot be empty"),
    ("/quiz", "topic", "Topic cannot be empty"),
];

fn test_app(enabled: bool, policy: StatusPolicy) -> (Router, Arc<MockTextProvider>) {
    let mock = Arc::new(MockTextProvider::new(enabled));
    let generator = Generator::new(mock.clone());
    (build_router(AppState::new(generator, policy)), mock)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn keys(body: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = body
        .as_object()
        .expect("response body must be a JSON object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

#[tokio::test]
async fn empty_fields_are_rejected_without_generation() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    for (endpoint, field, message) in ENDPOINTS {
        for body in [
            "{}".to_string(),
            json!({ field: "" }).to_string(),
            json!({ field: "   \n\t" }).to_string(),
            json!({ field: null }).to_string(),
        ] {
            let (status, response) = send(&app, post_json(endpoint, &body)).await;

            assert_eq!(status, StatusCode::OK, "{endpoint} {body}");
            assert_eq!(response, json!({ "error": message }), "{endpoint} {body}");
        }
    }

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn explain_generates_once_with_topic_prompt() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let (status, body) = send(&app, post_json("/explain", r#"{"topic": "gravity"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body), ["result"]);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("Explain gravity"));
    assert_eq!(calls[0].params.max_new_tokens, 300);
    assert_eq!(
        body["result"],
        format!("Mock response for: {}", calls[0].prompt)
    );
}

#[tokio::test]
async fn topic_is_trimmed_before_templating() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    send(&app, post_json("/quiz", r#"{"topic": "  the French Revolution \n"}"#)).await;

    assert_eq!(
        mock.calls()[0].prompt,
        "Generate 5 multiple choice questions on the French Revolution with 4 options and show the correct answer."
    );
}

#[tokio::test]
async fn flashcard_generates_question_then_answer() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let (status, body) = send(&app, post_json("/flashcard", r#"{"topic": "photosynthesis"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body), ["answer", "question"]);

    let calls = mock.calls();
    let budgets: Vec<u32> = calls.iter().map(|c| c.params.max_new_tokens).collect();
    assert_eq!(budgets, [60, 300]);
    assert!(calls[0].prompt.contains("question for revision on photosynthesis"));
    assert!(calls[1].prompt.contains("about photosynthesis in detail"));
}

#[tokio::test]
async fn summarize_embeds_notes_verbatim() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let (status, body) = send(&app, post_json("/summarize", r#"{"notes": "cats are mammals"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body), ["result"]);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].prompt,
        "Summarize the following notes into clear bullet points with explanations:\ncats are mammals"
    );
    assert_eq!(calls[0].params.max_new_tokens, 250);
}

#[tokio::test]
async fn exam_tips_uses_full_budget() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let (_, body) = send(&app, post_json("/exam_tips", r#"{"topic": "optics"}"#)).await;

    assert_eq!(keys(&body), ["result"]);
    let calls = mock.calls();
    assert!(calls[0]
        .prompt
        .starts_with("Generate exam tips, key points, important facts, and formulas for optics."));
    assert_eq!(calls[0].params.max_new_tokens, 300);
}

#[tokio::test]
async fn validation_errors_do_not_depend_on_provider_state() {
    let (healthy, _) = test_app(true, StatusPolicy::Compat);
    let (failing, _) = test_app(false, StatusPolicy::Compat);

    let mut seen = Vec::new();
    for app in [&healthy, &failing, &healthy, &failing] {
        seen.push(send(app, post_json("/explain", r#"{"topic": " "}"#)).await);
    }

    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn failing_provider_yields_sentinel_with_ok_status() {
    let (app, mock) = test_app(false, StatusPolicy::Compat);

    for (endpoint, field, _) in ENDPOINTS {
        let body = json!({ field: "anything at all" }).to_string();
        let (status, response) = send(&app, post_json(endpoint, &body)).await;

        assert_eq!(status, StatusCode::OK, "{endpoint}");
        if endpoint == "/flashcard" {
            assert_eq!(
                response,
                json!({ "question": SENTINEL, "answer": SENTINEL })
            );
        } else {
            assert_eq!(response, json!({ "result": SENTINEL }), "{endpoint}");
        }
    }

    // flashcard makes two calls, the other four one each
    assert_eq!(mock.call_count(), 6);
}

#[tokio::test]
async fn strict_policy_maps_failures_to_status_codes() {
    let (app, mock) = test_app(false, StatusPolicy::Strict);

    let (status, body) = send(&app, post_json("/summarize", r#"{"notes": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Notes cannot be empty" }));
    assert_eq!(mock.call_count(), 0);

    let (status, body) = send(&app, post_json("/explain", r#"{"topic": "gravity"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "error": SENTINEL, "details": "not_configured" })
    );
}

#[tokio::test]
async fn strict_flashcard_stops_after_failed_question() {
    let (app, mock) = test_app(false, StatusPolicy::Strict);

    let (status, _) = send(&app, post_json("/flashcard", r#"{"topic": "cells"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn strict_policy_passes_successes_through() {
    let (app, _) = test_app(true, StatusPolicy::Strict);

    let (status, body) = send(&app, post_json("/quiz", r#"{"topic": "optics"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body), ["result"]);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let (status, body) = send(&app, post_json("/explain", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, post_json("/explain", r#"{"topic": 42}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/explain")
        .body(Body::from(r#"{"topic": "gravity"}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn study_routes_only_accept_post() {
    let (app, _) = test_app(true, StatusPolicy::Compat);

    for (endpoint, _, _) in ENDPOINTS {
        let request = Request::builder()
            .method(Method::GET)
            .uri(endpoint)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{endpoint}");
    }
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (app, _) = test_app(true, StatusPolicy::Compat);

    let request = Request::builder()
        .uri("/flashcards")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn root_serves_static_page() {
    let (app, mock) = test_app(true, StatusPolicy::Compat);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("StudyGenie"));
    assert!(page.contains(r#"data-endpoint="exam_tips""#));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (app, _) = test_app(true, StatusPolicy::Compat);

    let mut request = post_json("/explain", r#"{"topic": "gravity"}"#);
    request
        .headers_mut()
        .insert("x-request-id", "study-42".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "study-42");
}

#[tokio::test]
async fn probes_report_provider_state() {
    let (healthy, _) = test_app(true, StatusPolicy::Compat);
    let (failing, _) = test_app(false, StatusPolicy::Compat);

    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, body) = send(&healthy, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "mock");

    let (status, _) = send(&healthy, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&failing, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
