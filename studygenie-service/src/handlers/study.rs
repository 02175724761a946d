//! The five study endpoints.
//!
//! Each handler trims its required field, rejects it when empty, fills the
//! task's prompt template and calls the generator. How failures map to HTTP
//! status codes is decided by [`StatusPolicy`].

use crate::config::StatusPolicy;
use crate::models::{FlashcardResponse, NotesRequest, ResultResponse, TopicRequest};
use crate::prompts::StudyTask;
use crate::services::{metrics, GenerationError, GENERATION_FAILED};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::{AppError, ErrorResponse};
use thiserror::Error;

type Payload<T> = Result<Json<T>, JsonRejection>;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub async fn explain(State(state): State<AppState>, payload: Payload<TopicRequest>) -> Response {
    let outcome = topic_result(&state, payload, StudyTask::Explain).await;
    respond(state.status_policy, "/explain", outcome)
}

pub async fn flashcard(State(state): State<AppState>, payload: Payload<TopicRequest>) -> Response {
    let outcome = flashcard_pair(&state, payload).await;
    respond(state.status_policy, "/flashcard", outcome)
}

pub async fn summarize(State(state): State<AppState>, payload: Payload<NotesRequest>) -> Response {
    let outcome = notes_summary(&state, payload).await;
    respond(state.status_policy, "/summarize", outcome)
}

pub async fn exam_tips(State(state): State<AppState>, payload: Payload<TopicRequest>) -> Response {
    let outcome = topic_result(&state, payload, StudyTask::ExamTips).await;
    respond(state.status_policy, "/exam_tips", outcome)
}

pub async fn quiz(State(state): State<AppState>, payload: Payload<TopicRequest>) -> Response {
    let outcome = topic_result(&state, payload, StudyTask::Quiz).await;
    respond(state.status_policy, "/quiz", outcome)
}

async fn topic_result(
    state: &AppState,
    payload: Payload<TopicRequest>,
    task: StudyTask,
) -> Result<ResultResponse, StudyError> {
    let Json(request) = payload?;
    let topic = required(request.topic.as_deref(), "Topic")?;

    Ok(ResultResponse {
        result: complete(state, task, topic).await?,
    })
}

async fn flashcard_pair(
    state: &AppState,
    payload: Payload<TopicRequest>,
) -> Result<FlashcardResponse, StudyError> {
    let Json(request) = payload?;
    let topic = required(request.topic.as_deref(), "Topic")?;

    let question = complete(state, StudyTask::FlashcardQuestion, topic).await?;
    let answer = complete(state, StudyTask::FlashcardAnswer, topic).await?;

    Ok(FlashcardResponse { question, answer })
}

async fn notes_summary(
    state: &AppState,
    payload: Payload<NotesRequest>,
) -> Result<ResultResponse, StudyError> {
    let Json(request) = payload?;
    let notes = required(request.notes.as_deref(), "Notes")?;

    Ok(ResultResponse {
        result: complete(state, StudyTask::Summarize, notes).await?,
    })
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, StudyError> {
    let value = value.unwrap_or_default().trim();
    if value.is_empty() {
        Err(StudyError::EmptyField(field))
    } else {
        Ok(value)
    }
}

async fn complete(state: &AppState, task: StudyTask, input: &str) -> Result<String, StudyError> {
    let prompt = task.prompt(input);
    let max_new_tokens = task.max_new_tokens();

    tracing::info!(
        task = ?task,
        input_len = input.len(),
        max_new_tokens,
        "Generating study content"
    );

    match state.status_policy {
        StatusPolicy::Compat => Ok(state
            .generator
            .generate_or_sentinel(&prompt, max_new_tokens)
            .await),
        StatusPolicy::Strict => Ok(state.generator.generate(&prompt, max_new_tokens).await?),
    }
}

fn respond<T: Serialize>(
    policy: StatusPolicy,
    endpoint: &'static str,
    outcome: Result<T, StudyError>,
) -> Response {
    match outcome {
        Ok(body) => Json(body).into_response(),
        Err(err @ StudyError::EmptyField(_)) => {
            metrics::record_validation_rejection(endpoint);
            tracing::info!(endpoint, error = %err, "Rejected study request");

            match policy {
                StatusPolicy::Compat => Json(ErrorResponse::new(err.to_string())).into_response(),
                StatusPolicy::Strict => AppError::BadRequest(err.into()).into_response(),
            }
        }
        Err(StudyError::Body(rejection)) => {
            tracing::info!(endpoint, error = %rejection, "Rejected malformed request body");
            AppError::from(rejection).into_response()
        }
        Err(StudyError::Generation(err)) => AppError::BadGateway {
            message: GENERATION_FAILED.to_string(),
            details: Some(err.reason().to_string()),
        }
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank_values() {
        assert_eq!(required(Some("  gravity \n"), "Topic").unwrap(), "gravity");
        assert!(matches!(
            required(Some(" \t "), "Topic"),
            Err(StudyError::EmptyField("Topic"))
        ));
        assert!(matches!(
            required(None, "Notes"),
            Err(StudyError::EmptyField("Notes"))
        ));
    }

    #[test]
    fn empty_field_message() {
        assert_eq!(
            StudyError::EmptyField("Notes").to_string(),
            "Notes cannot be empty"
        );
    }
}
