//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `nvidia_operator_triggers_total` - Lifecycle triggers handled, by trigger
//! - `nvidia_operator_deferrals_total` - Triggers deferred for retry, by trigger
//! - `nvidia_operator_resources_applied_total` - Resources applied to the cluster
//! - `nvidia_operator_resources_deleted_total` - Resources deleted from the cluster
//! - `nvidia_operator_transform_skips_total` - Resources a transform left untouched, by transform

use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static TRIGGERS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "nvidia_operator_triggers_total",
            "Total number of lifecycle triggers handled",
        ),
        &["trigger"],
    )
    .expect("Failed to create TRIGGERS_TOTAL metric - this should never happen")
});

static DEFERRALS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "nvidia_operator_deferrals_total",
            "Total number of triggers deferred for retry",
        ),
        &["trigger"],
    )
    .expect("Failed to create DEFERRALS_TOTAL metric - this should never happen")
});

static RESOURCES_APPLIED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "nvidia_operator_resources_applied_total",
        "Total number of resources applied to the cluster",
    )
    .expect("Failed to create RESOURCES_APPLIED_TOTAL metric - this should never happen")
});

static RESOURCES_DELETED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "nvidia_operator_resources_deleted_total",
        "Total number of resources deleted from the cluster",
    )
    .expect("Failed to create RESOURCES_DELETED_TOTAL metric - this should never happen")
});

static TRANSFORM_SKIPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "nvidia_operator_transform_skips_total",
            "Total number of resources a transform could not rewrite",
        ),
        &["transform"],
    )
    .expect("Failed to create TRANSFORM_SKIPS_TOTAL metric - this should never happen")
});

/// Register all metrics with the registry
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    let collectors: [Box<dyn prometheus::core::Collector>; 5] = [
        Box::new(TRIGGERS_TOTAL.clone()),
        Box::new(DEFERRALS_TOTAL.clone()),
        Box::new(RESOURCES_APPLIED_TOTAL.clone()),
        Box::new(RESOURCES_DELETED_TOTAL.clone()),
        Box::new(TRANSFORM_SKIPS_TOTAL.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Render the registry in the Prometheus text exposition format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn increment_triggers(trigger: &str) {
    TRIGGERS_TOTAL.with_label_values(&[trigger]).inc();
}

pub fn increment_deferrals(trigger: &str) {
    DEFERRALS_TOTAL.with_label_values(&[trigger]).inc();
}

pub fn increment_resources_applied() {
    RESOURCES_APPLIED_TOTAL.inc();
}

pub fn increment_resources_deleted() {
    RESOURCES_DELETED_TOTAL.inc();
}

pub fn increment_transform_skips(transform: &str) {
    TRANSFORM_SKIPS_TOTAL.with_label_values(&[transform]).inc();
}
