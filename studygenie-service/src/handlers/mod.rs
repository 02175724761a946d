//! HTTP handlers for the StudyGenie service.

pub mod app;
pub mod study;
