//! # Runtime
//!
//! The lifecycle-manager side of the controller: trigger deferral and the
//! status records it displays.

pub mod scheduler;

pub use scheduler::{LifecycleScheduler, LocalScheduler, StatusRecord};
