use serde::{Deserialize, Serialize};

/// Body of `/explain`, `/flashcard`, `/exam_tips` and `/quiz`.
///
/// A missing or `null` topic is treated like an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct TopicRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

/// Body of `/summarize`.
#[derive(Debug, Default, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct FlashcardResponse {
    pub question: String,
    pub answer: String,
}
