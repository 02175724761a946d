//! Request and response bodies for the study endpoints.

pub mod study;

pub use study::{FlashcardResponse, NotesRequest, ResultResponse, TopicRequest};
