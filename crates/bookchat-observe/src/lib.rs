//! Observability setup for bookchat: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
