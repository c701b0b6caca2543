//! # Validation
//!
//! Validates deployment options against their schemas and builds the
//! effective configuration manifests are rendered from.

pub mod config;
pub mod effective;
pub mod schema;

pub use config::{
    configured_namespace, policy_strictness, AvailableData, ConfigValidator, FieldSchema,
    GovernedField, RawConfig,
};
pub use effective::EffectiveConfig;
pub use schema::{ObjectSchema, PolicyStrictness, SchemaViolation};
