//! # Configuration Validation
//!
//! Validates raw deployment options and produces the normalized option mapping
//! the manifests are rendered from.

use crate::constants::{DEFAULT_NAMESPACE, OPTION_NAMESPACE, OPTION_NIC_CLUSTER_POLICY_VALIDATION};
use crate::controller::reconciler::validation::schema::{ObjectSchema, PolicyStrictness};
use std::collections::BTreeMap;
use tracing::debug;

/// Options as delivered by the lifecycle manager (option name to value)
pub type RawConfig = BTreeMap<String, serde_yaml::Value>;

/// Schema applied to a YAML-carrying option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSchema {
    NfdWorker,
    NicClusterPolicy,
}

/// A configuration option whose string value is a YAML document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernedField {
    pub name: &'static str,
    /// When false an unset or empty value is accepted and validated later
    /// by the manifest readiness gate
    pub required: bool,
    pub schema: FieldSchema,
}

/// Normalized options: YAML documents parsed, empty and null values dropped
///
/// Only [`ConfigValidator::available_data`] produces this type.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableData(BTreeMap<String, serde_yaml::Value>);

impl AvailableData {
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_yaml::Value)> {
        self.0.iter()
    }

    pub(crate) fn into_inner(self) -> BTreeMap<String, serde_yaml::Value> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ConfigValidator {
    fields: Vec<GovernedField>,
}

impl ConfigValidator {
    /// Fields are evaluated in the order given
    pub fn new(fields: &[GovernedField]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }

    pub fn fields(&self) -> &[GovernedField] {
        &self.fields
    }

    /// Determine if configuration is valid
    ///
    /// Returns the reason for the first failing field, or `None`.
    pub fn evaluate(&self, raw: &RawConfig) -> Option<String> {
        for field in &self.fields {
            if !field.required && raw.get(field.name).is_none_or(is_unset) {
                continue;
            }

            let schema = match field.schema {
                FieldSchema::NfdWorker => ObjectSchema::nfd_worker(),
                FieldSchema::NicClusterPolicy => match policy_strictness(raw) {
                    Ok(strictness) => ObjectSchema::nic_cluster_policy(strictness),
                    Err(reason) => return Some(reason),
                },
            };

            let Some(document) = parse_field(raw, field.name) else {
                return Some(format!("{} is not valid YAML", field.name));
            };

            if let Err(violation) = schema.validate(&document) {
                debug!("{} failed schema validation: {}", field.name, violation);
                return Some(format!("{} is invalid", field.name));
            }
        }
        None
    }

    /// Parse valid options into a mapping, dropping keys that are unset
    pub fn available_data(&self, raw: &RawConfig) -> AvailableData {
        let mut data = BTreeMap::new();
        for (key, value) in raw {
            let value = if self.fields.iter().any(|f| f.name == key.as_str()) {
                parse_field(raw, key).unwrap_or(serde_yaml::Value::Null)
            } else {
                value.clone()
            };
            data.insert(key.clone(), value);
        }
        data.retain(|_, value| !is_unset(value));
        AvailableData(data)
    }
}

/// Namespace currently requested by the options
pub fn configured_namespace(raw: &RawConfig) -> String {
    raw.get(OPTION_NAMESPACE)
        .and_then(serde_yaml::Value::as_str)
        .filter(|ns| !ns.is_empty())
        .unwrap_or(DEFAULT_NAMESPACE)
        .to_string()
}

/// Strictness for the NicClusterPolicy schema, strict when unset
pub fn policy_strictness(raw: &RawConfig) -> Result<PolicyStrictness, String> {
    match option_text(raw, OPTION_NIC_CLUSTER_POLICY_VALIDATION) {
        None => Ok(PolicyStrictness::default()),
        Some(text) => text
            .parse()
            .map_err(|_| format!("{OPTION_NIC_CLUSTER_POLICY_VALIDATION} is invalid")),
    }
}

/// Empty strings and nulls are treated as unset
pub(crate) fn is_unset(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Non-empty string value of an option
fn option_text<'a>(raw: &'a RawConfig, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(serde_yaml::Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Parse a YAML-carrying option, `None` on failure or a null document
///
/// Values that already arrive as structured YAML are taken as they are.
fn parse_field(raw: &RawConfig, key: &str) -> Option<serde_yaml::Value> {
    let value = raw.get(key)?;
    let document = match value {
        serde_yaml::Value::String(text) => match serde_yaml::from_str(text) {
            Ok(document) => document,
            Err(e) => {
                debug!("{} is not valid YAML: {}", key, e);
                return None;
            }
        },
        other => other.clone(),
    };
    if document.is_null() {
        None
    } else {
        Some(document)
    }
}
