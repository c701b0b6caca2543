//! # Observability
//!
//! Prometheus metrics collection. Logging goes through `tracing` and is set
//! up by the binary.

pub mod metrics;

pub use metrics::*;
