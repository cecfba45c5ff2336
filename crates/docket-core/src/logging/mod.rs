//! Observability for docket.
//! `tracing` with `EnvFilter` and named structured events.

pub mod events;
pub mod setup;

pub use setup::{init_tracing, init_tracing_with_filter};
