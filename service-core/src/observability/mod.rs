pub mod logging;
pub mod metrics;
pub mod trace_context;

pub use self::logging::{init_tracing, shutdown_tracing};
pub use self::metrics::{init_metrics, render_metrics};
pub use self::trace_context::{
    TRACEPARENT_HEADER, TRACESTATE_HEADER, TracedClientExt, TracedRequest, inject_trace_context,
};
