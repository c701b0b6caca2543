//! # Schemas
//!
//! Structural checks applied to the YAML documents carried in configuration
//! options. Each schema describes an object with required keys, keys that must
//! hold mappings, and keys that must equal a literal.

use crate::constants::NIC_CLUSTER_POLICY_KIND;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("document is not an object")]
    NotAnObject,
    #[error("required key '{0}' is missing")]
    MissingKey(&'static str),
    #[error("key '{0}' must be an object")]
    NotAnObjectProperty(&'static str),
    #[error("key '{key}' must equal '{expected}'")]
    LiteralMismatch {
        key: &'static str,
        expected: &'static str,
    },
}

/// Strictness applied to the NicClusterPolicy document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyStrictness {
    /// Only `kind: NicClusterPolicy` is required
    Lenient,
    /// `apiVersion`, `kind: NicClusterPolicy` and `metadata` are required
    #[default]
    Strict,
}

impl PolicyStrictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStrictness::Lenient => "lenient",
            PolicyStrictness::Strict => "strict",
        }
    }
}

impl fmt::Display for PolicyStrictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(PolicyStrictness::Lenient),
            "strict" => Ok(PolicyStrictness::Strict),
            other => Err(format!(
                "unknown policy strictness '{other}', expected one of: strict, lenient"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSchema {
    required: Vec<&'static str>,
    object_properties: Vec<&'static str>,
    literals: Vec<(&'static str, &'static str)>,
}

impl ObjectSchema {
    /// NFD worker configuration: an object with a `sources` object
    pub fn nfd_worker() -> Self {
        Self {
            required: vec!["sources"],
            object_properties: vec!["sources"],
            literals: vec![],
        }
    }

    /// NicClusterPolicy document at the given strictness
    pub fn nic_cluster_policy(strictness: PolicyStrictness) -> Self {
        let required = match strictness {
            PolicyStrictness::Lenient => vec!["kind"],
            PolicyStrictness::Strict => vec!["apiVersion", "kind", "metadata"],
        };
        Self {
            required,
            object_properties: vec![],
            literals: vec![("kind", NIC_CLUSTER_POLICY_KIND)],
        }
    }

    pub fn validate(&self, document: &serde_yaml::Value) -> Result<(), SchemaViolation> {
        let mapping = document.as_mapping().ok_or(SchemaViolation::NotAnObject)?;

        for &key in &self.required {
            if !mapping.contains_key(key) {
                return Err(SchemaViolation::MissingKey(key));
            }
        }

        for &key in &self.object_properties {
            if let Some(value) = mapping.get(key) {
                if !value.is_mapping() {
                    return Err(SchemaViolation::NotAnObjectProperty(key));
                }
            }
        }

        for &(key, expected) in &self.literals {
            if let Some(value) = mapping.get(key) {
                if value.as_str() != Some(expected) {
                    return Err(SchemaViolation::LiteralMismatch { key, expected });
                }
            }
        }

        Ok(())
    }
}
