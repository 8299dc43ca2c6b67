//! Observability: structured logging and per-dispatcher metrics

pub mod logging;
pub mod metrics;

pub use logging::{init_default_logging, init_logging, parse_level, LogFormat};
pub use metrics::{DispatchMetrics, HandlerStatsSnapshot, MetricsSnapshot};

pub use logging::{dispatch_span, fetch_span, handler_span};
