//! # Status
//!
//! The status surfaced to the lifecycle manager, derived on every status
//! check and never persisted.

mod report;

pub use report::{derive, StatusReport, VersionInfo};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Work in progress
    Maintenance(String),
    /// Waiting on the cluster; one reason per unready resource
    Waiting(Vec<String>),
    /// Needs operator intervention
    Blocked(String),
    Active(String),
}

impl Status {
    pub fn waiting(reason: impl Into<String>) -> Self {
        Status::Waiting(vec![reason.into()])
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Maintenance(_) => "maintenance",
            Status::Waiting(_) => "waiting",
            Status::Blocked(_) => "blocked",
            Status::Active(_) => "active",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Maintenance(message) | Status::Blocked(message) | Status::Active(message) => {
                f.write_str(message)
            }
            Status::Waiting(reasons) => f.write_str(&reasons.join(", ")),
        }
    }
}
