//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_FIELD_MANAGER, DEFAULT_MANIFESTS_DIR,
};
use std::path::PathBuf;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Application name
    /// Written as the `app.kubernetes.io/managed-by` label on every rendered resource
    pub app_name: String,
    /// Root directory of the template sets (`<dir>/<deployment>/manifests/<release>/`)
    pub manifests_dir: PathBuf,
    /// Field manager used for server-side apply
    pub field_manager: String,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    /// Used when `RUST_LOG` is not set
    pub log_level: String,
    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            manifests_dir: PathBuf::from(DEFAULT_MANIFESTS_DIR),
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            log_level: "INFO".to_string(),
            enable_metrics: true,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            app_name: env_var_or_default_str("APP_NAME", DEFAULT_APP_NAME),
            manifests_dir: PathBuf::from(env_var_or_default_str(
                "MANIFESTS_DIR",
                DEFAULT_MANIFESTS_DIR,
            )),
            field_manager: env_var_or_default_str("FIELD_MANAGER", DEFAULT_FIELD_MANAGER),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            enable_metrics: env_var_or_default_bool("ENABLE_METRICS", true),
        }
    }

    /// Tracing filter directive derived from `log_level`
    pub fn log_filter(&self) -> String {
        format!("nvidia_operator_controller={}", self.log_level.to_lowercase())
    }
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| {
            let v_lower = v.to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
