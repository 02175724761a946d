pub mod generation;
pub mod metrics;
pub mod providers;

pub use generation::{GenerationError, Generator, GENERATION_FAILED};
