pub mod logging;
pub mod propagation;

pub use logging::init_tracing;
pub use propagation::{TRACEPARENT_HEADER, TRACESTATE_HEADER, trace_headers};
